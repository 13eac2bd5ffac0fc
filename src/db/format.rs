//! Result formatting.
//!
//! Turns the column descriptor and the returned tuples of a successful
//! statement into column names and ordered row-mappings.

use crate::models::{Row, SqlValue};

/// Zip every tuple with the column names, preserving column order.
///
/// Values pass through unchanged, including nulls. A tuple shorter than the
/// descriptor only fills the leading columns.
pub fn format_rows(columns: &[String], tuples: Vec<Vec<SqlValue>>) -> (Vec<String>, Vec<Row>) {
    let rows = tuples
        .into_iter()
        .map(|tuple| {
            let mut row = Row::with_capacity(columns.len());
            for (column, value) in columns.iter().zip(tuple) {
                row.insert(column.as_str(), value);
            }
            row
        })
        .collect();

    (columns.to_vec(), rows)
}
