use std::collections::BTreeMap;

use log::debug;

use super::model::{Metadata, Scalar, Tables};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Per-field admissible values: field_name → values that keep a table.
/// An empty map admits every table.
pub type Criteria = BTreeMap<String, Vec<Scalar>>;

/// Pseudo column name that selects the row index in [`filter_rows`].
pub const INDEX_COLUMN: &str = "index";

/// Whether a table's metadata passes every criterion.
///
/// Numbers match by value, so `2020` admits `2020.0`. A missing metadata
/// record, a record without one of the criterion fields, or a field holding
/// an array or object fails that criterion.
pub fn meta_matches(meta: Option<&Metadata>, criteria: &Criteria) -> bool {
    criteria.iter().all(|(field, admissible)| {
        meta.and_then(|m| m.get(field))
            .and_then(Scalar::from_json)
            .is_some_and(|value| admissible.iter().any(|a| a.loosely_eq(&value)))
    })
}

/// Drop every table whose metadata falls outside `criteria`.
pub fn filter_meta(
    mut tables: Tables,
    metadata: &BTreeMap<String, Metadata>,
    criteria: &Criteria,
) -> Tables {
    tables.retain(|id, _| {
        let keep = meta_matches(metadata.get(id), criteria);
        if !keep {
            debug!("metadata filter removed table '{id}'");
        }
        keep
    });
    tables
}

/// Keep only rows whose value in `column` (or in the row index when `column`
/// is [`INDEX_COLUMN`]) is one of `rows`.
///
/// An empty `rows` list means no restriction. A table without `column` is an
/// error and nothing is filtered.
pub fn filter_rows(tables: Tables, column: &str, rows: &[Scalar]) -> Result<Tables> {
    if rows.is_empty() {
        return Ok(tables);
    }
    let admitted = |value: &Scalar| rows.iter().any(|r| r.loosely_eq(value));

    tables
        .into_iter()
        .map(|(id, table)| {
            let filtered = if column == INDEX_COLUMN {
                table.retain_rows(|r| admitted(&table.index[r]))
            } else {
                let values = table.column(column).ok_or_else(|| PipelineError::UnknownColumn {
                    table: id.clone(),
                    column: column.to_string(),
                })?;
                table.retain_rows(|r| admitted(&values[r]))
            };
            debug!(
                "row filter on '{column}' kept {}/{} rows of '{id}'",
                filtered.row_count(),
                table.row_count()
            );
            Ok((id, filtered))
        })
        .collect()
}

/// Restrict each table to the named columns, in the requested order.
///
/// An empty `columns` list means no restriction; names a table lacks are
/// skipped.
pub fn filter_cols(tables: Tables, columns: &[String]) -> Tables {
    if columns.is_empty() {
        return tables;
    }
    tables
        .into_iter()
        .map(|(id, mut table)| {
            let picked: Vec<usize> = columns
                .iter()
                .filter_map(|name| table.column_position(name))
                .collect();
            table.columns = picked.iter().map(|&i| table.columns[i].clone()).collect();
            table.data = picked.iter().map(|&i| table.data[i].clone()).collect();
            (id, table)
        })
        .collect()
}
