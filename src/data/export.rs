use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::model::{Metadata, Scalar, Table, Tables};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// Shape of a serialized table, named after the pandas `to_dict` orients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `{column: {row_label: value}}`
    #[default]
    Dict,
    /// `{column: [values]}`
    List,
    /// `[{column: value}, ...]`, one object per row
    Records,
    /// `{row_label: {column: value}}`
    Index,
    /// `{"index": [...], "columns": [...], "data": [[row values]]}`
    Split,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Dict => "dict",
            Orientation::List => "list",
            Orientation::Records => "records",
            Orientation::Index => "index",
            Orientation::Split => "split",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dict" => Ok(Orientation::Dict),
            "list" => Ok(Orientation::List),
            "records" => Ok(Orientation::Records),
            "index" => Ok(Orientation::Index),
            "split" => Ok(Orientation::Split),
            _ => Err(PipelineError::UnknownOrientation(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One exported dataset: serialized cells plus its metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    pub table: JsonValue,
    pub meta: Metadata,
}

/// Exported datasets keyed by table id.
pub type Output = BTreeMap<String, ExportEntry>;

/// Serialize every table together with its metadata.
///
/// Tables without a metadata record get an empty one.
pub fn export(
    tables: &Tables,
    metadata: &BTreeMap<String, Metadata>,
    orientation: Orientation,
) -> Output {
    tables
        .iter()
        .map(|(id, table)| {
            let entry = ExportEntry {
                table: serialize_table(table, orientation),
                meta: metadata.get(id).cloned().unwrap_or_default(),
            };
            (id.clone(), entry)
        })
        .collect()
}

/// Render a table as plain JSON in the given orientation.
///
/// In the `Dict` and `Index` orientations row labels become object keys via
/// their `Display` text: a float label `1.0` gives the key `"1"`, and when two
/// rows share a key the later row's value wins. `List`, `Records` and `Split`
/// keep every row.
pub fn serialize_table(table: &Table, orientation: Orientation) -> JsonValue {
    match orientation {
        Orientation::Dict => JsonValue::Object(
            table
                .columns
                .iter()
                .zip(&table.data)
                .map(|(name, col)| (name.clone(), JsonValue::Object(labelled(&table.index, col))))
                .collect(),
        ),
        Orientation::List => JsonValue::Object(
            table
                .columns
                .iter()
                .zip(&table.data)
                .map(|(name, col)| (name.clone(), JsonValue::Array(col.iter().map(to_json).collect())))
                .collect(),
        ),
        Orientation::Records => JsonValue::Array(
            (0..table.row_count())
                .map(|r| JsonValue::Object(row_object(table, r)))
                .collect(),
        ),
        Orientation::Index => JsonValue::Object(
            table
                .index
                .iter()
                .enumerate()
                .map(|(r, label)| (label.to_string(), JsonValue::Object(row_object(table, r))))
                .collect(),
        ),
        Orientation::Split => {
            let mut out = Map::new();
            out.insert(
                "index".into(),
                JsonValue::Array(table.index.iter().map(to_json).collect()),
            );
            out.insert(
                "columns".into(),
                JsonValue::Array(table.columns.iter().cloned().map(JsonValue::String).collect()),
            );
            out.insert(
                "data".into(),
                JsonValue::Array(
                    (0..table.row_count())
                        .map(|r| JsonValue::Array(table.data.iter().map(|col| to_json(&col[r])).collect()))
                        .collect(),
                ),
            );
            JsonValue::Object(out)
        }
    }
}

fn to_json(value: &Scalar) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

fn labelled(index: &[Scalar], col: &[Scalar]) -> Map<String, JsonValue> {
    index
        .iter()
        .zip(col)
        .map(|(label, value)| (label.to_string(), to_json(value)))
        .collect()
}

fn row_object(table: &Table, row: usize) -> Map<String, JsonValue> {
    table
        .columns
        .iter()
        .zip(&table.data)
        .map(|(name, col)| (name.clone(), to_json(&col[row])))
        .collect()
}
