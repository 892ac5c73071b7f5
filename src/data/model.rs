use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Scalar – a single cell, label or metadata value
// ---------------------------------------------------------------------------

/// A dynamically-typed value mirroring the cell types a raw grid can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{s}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl Scalar {
    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Equality where integers and floats compare by numeric value.
    pub fn loosely_eq(&self, other: &Scalar) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// The scalar held by a JSON value. Arrays and objects have none.
    pub fn from_json(value: &JsonValue) -> Option<Scalar> {
        match value {
            JsonValue::Null => Some(Scalar::Null),
            JsonValue::Bool(b) => Some(Scalar::Bool(*b)),
            JsonValue::Number(n) => Some(match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            JsonValue::String(s) => Some(Scalar::String(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

/// Per-table attributes, kept exactly as the host supplied them.
pub type Metadata = serde_json::Map<String, JsonValue>;

// ---------------------------------------------------------------------------
// Table – one named dataset
// ---------------------------------------------------------------------------

/// A column-major table with a row index.
///
/// `data[c][r]` is the cell of column `columns[c]` at row `index[r]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Row labels, not necessarily unique or numeric.
    pub index: Vec<Scalar>,
    /// Column names, aligned to `data`.
    pub columns: Vec<String>,
    /// Cell values per column.
    pub data: Vec<Vec<Scalar>>,
}

impl Table {
    /// Build a table, checking that every column matches the index length.
    pub fn new(index: Vec<Scalar>, columns: Vec<String>, data: Vec<Vec<Scalar>>) -> Result<Self> {
        if columns.len() != data.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: columns.len(),
                found: data.len(),
            });
        }
        if let Some(bad) = data.iter().find(|col| col.len() != index.len()) {
            return Err(PipelineError::ShapeMismatch {
                expected: index.len(),
                found: bad.len(),
            });
        }
        Ok(Self {
            index,
            columns,
            data,
        })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table holds no cells.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of a column by name.
    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.column_position(name).map(|i| self.data[i].as_slice())
    }

    /// Cell at (`row`, `col`) positions.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Scalar> {
        self.data.get(col).and_then(|c| c.get(row))
    }

    /// Sum of all numeric cells; anything else counts as zero.
    pub fn total(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .map(|v| v.as_f64().unwrap_or(0.0))
            .sum()
    }

    /// Keep only the rows whose position satisfies `keep`.
    pub fn retain_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        let rows: Vec<usize> = (0..self.row_count()).filter(|&r| keep(r)).collect();
        Table {
            index: rows.iter().map(|&r| self.index[r].clone()).collect(),
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|col| rows.iter().map(|&r| col[r].clone()).collect())
                .collect(),
        }
    }
}

/// Named tables. Keys are table ids.
pub type Tables = BTreeMap<String, Table>;

// ---------------------------------------------------------------------------
// Frame – a table slot that may be invalid
// ---------------------------------------------------------------------------

/// A table that may be missing. Updates on an invalid frame are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Frame {
    Valid(Table),
    #[default]
    Invalid,
}

impl Frame {
    /// Apply `f` to the held table, or stay invalid.
    pub fn map(self, f: impl FnOnce(Table) -> Table) -> Frame {
        match self {
            Frame::Valid(table) => Frame::Valid(f(table)),
            Frame::Invalid => Frame::Invalid,
        }
    }

    /// Like [`Frame::map`] for updates that can themselves invalidate the frame.
    pub fn and_then(self, f: impl FnOnce(Table) -> Frame) -> Frame {
        match self {
            Frame::Valid(table) => f(table),
            Frame::Invalid => Frame::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Frame::Valid(_))
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Frame::Valid(table) => Some(table),
            Frame::Invalid => None,
        }
    }
}

impl From<Option<Table>> for Frame {
    fn from(table: Option<Table>) -> Self {
        table.map_or(Frame::Invalid, Frame::Valid)
    }
}
