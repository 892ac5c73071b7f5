use log::debug;

use super::model::{Scalar, Table, Tables};

/// Id of the running total produced by [`accumulate_sum`].
pub const SUM_TABLE: &str = "sum";

/// Name of the single column produced by [`row_sums`].
pub const ROW_SUM_COLUMN: &str = "0";

fn numeric(value: &Scalar) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

/// Collapse each table into one row holding the total of every column.
pub fn column_sums(tables: &Tables) -> Tables {
    tables
        .iter()
        .map(|(id, table)| {
            let sums = table
                .data
                .iter()
                .map(|col| vec![Scalar::Float(col.iter().map(numeric).sum())])
                .collect();
            let out = Table {
                index: vec![Scalar::Integer(0)],
                columns: table.columns.clone(),
                data: sums,
            };
            (id.clone(), out)
        })
        .collect()
}

/// Collapse each table into one column holding the total of every row.
pub fn row_sums(tables: &Tables) -> Tables {
    tables
        .iter()
        .map(|(id, table)| {
            let sums = (0..table.row_count())
                .map(|r| Scalar::Float(table.data.iter().map(|col| numeric(&col[r])).sum()))
                .collect();
            let out = Table {
                index: table.index.clone(),
                columns: vec![ROW_SUM_COLUMN.to_string()],
                data: vec![sums],
            };
            (id.clone(), out)
        })
        .collect()
}

/// Add the [`SUM_TABLE`] entry: the aligned sum of every other table.
///
/// Labels missing from one operand count as zero. An existing
/// [`SUM_TABLE`] entry is replaced, never added into itself.
pub fn accumulate_sum(mut tables: Tables) -> Tables {
    tables.remove(SUM_TABLE);

    let mut sum: Option<Table> = None;
    for (id, table) in &tables {
        debug!("adding '{id}' into '{SUM_TABLE}'");
        sum = Some(match sum {
            None => table.clone(),
            Some(acc) => add_aligned(&acc, table),
        });
    }

    if let Some(sum) = sum {
        tables.insert(SUM_TABLE.to_string(), sum);
    }
    tables
}

/// Outer-join addition on row labels and column names with missing-as-zero.
///
/// Labels keep the order of `lhs`, followed by labels only `rhs` has.
pub fn add_aligned(lhs: &Table, rhs: &Table) -> Table {
    let mut index = lhs.index.clone();
    for label in &rhs.index {
        if !index.contains(label) {
            index.push(label.clone());
        }
    }
    let mut columns = lhs.columns.clone();
    for name in &rhs.columns {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let lookup = |table: &Table, row: &Scalar, col: &str| -> f64 {
        let r = table.index.iter().position(|l| l == row);
        let c = table.column_position(col);
        match (r, c) {
            (Some(r), Some(c)) => numeric(&table.data[c][r]),
            _ => 0.0,
        }
    };

    let data = columns
        .iter()
        .map(|col| {
            index
                .iter()
                .map(|row| {
                    let v = lookup(lhs, row, col) + lookup(rhs, row, col);
                    Scalar::Float(if v.is_nan() { 0.0 } else { v })
                })
                .collect()
        })
        .collect();

    Table {
        index,
        columns,
        data,
    }
}
