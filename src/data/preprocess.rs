use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Metadata, Scalar, Table};

// ---------------------------------------------------------------------------
// Raw input – what the host hands over
// ---------------------------------------------------------------------------

/// One raw dataset: a grid whose first row holds the column names and whose
/// first column holds the row labels, plus its metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(alias = "df")]
    pub table: Vec<Vec<Scalar>>,
    #[serde(default)]
    pub meta: Metadata,
}

/// Raw datasets keyed by table id.
pub type RawInput = BTreeMap<String, RawEntry>;

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Turn a raw grid into a numeric [`Table`].
///
/// Row 0 becomes the column names and column 0 becomes the row index; both
/// are dropped from the body. Every body cell is coerced with
/// [`coerce_numeric`]. Short rows are padded with zero and long rows are cut
/// to the header width.
pub fn preprocess_table(grid: &[Vec<Scalar>]) -> Table {
    let Some((header, body)) = grid.split_first() else {
        return Table::default();
    };

    let columns: Vec<String> = header.iter().skip(1).map(|c| c.to_string()).collect();
    let index: Vec<Scalar> = body
        .iter()
        .map(|row| row.first().cloned().unwrap_or(Scalar::Null))
        .collect();

    let data = (0..columns.len())
        .map(|c| {
            body.iter()
                .map(|row| Scalar::Float(row.get(c + 1).map_or(0.0, coerce_numeric)))
                .collect()
        })
        .collect();

    Table {
        index,
        columns,
        data,
    }
}

/// Numeric value of a raw cell; anything that does not parse becomes `0`.
pub fn coerce_numeric(value: &Scalar) -> f64 {
    let v = match value {
        Scalar::Float(v) => *v,
        Scalar::Integer(i) => *i as f64,
        Scalar::Bool(b) => f64::from(u8::from(*b)),
        Scalar::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Scalar::Null => 0.0,
    };
    if v.is_nan() {
        0.0
    } else {
        v
    }
}
