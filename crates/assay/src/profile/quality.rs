//! Per-table quality summaries: missing values, duplicates, data types.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::input::{NamedTables, Table};
use crate::schema::{ColumnType, Value};

/// Count of missing entries per column, for each table.
pub fn missing_values(tables: &NamedTables) -> IndexMap<String, IndexMap<String, usize>> {
    tables
        .iter()
        .map(|(name, table)| {
            let counts = table
                .columns
                .iter()
                .map(|col| {
                    let missing = table
                        .column_values(col.position)
                        .filter(|v| v.is_null())
                        .count();
                    (col.name.clone(), missing)
                })
                .collect();
            (name.to_string(), counts)
        })
        .collect()
}

/// Count of fully duplicated rows, for each table.
pub fn duplicate_count(tables: &NamedTables) -> IndexMap<String, usize> {
    tables
        .iter()
        .map(|(name, table)| (name.to_string(), count_duplicate_rows(table)))
        .collect()
}

/// Rows identical across every column to an earlier row.
///
/// The first occurrence of a row is not counted, so a row seen three times
/// contributes two.
pub fn count_duplicate_rows(table: &Table) -> usize {
    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(table.row_count());
    table
        .rows
        .iter()
        .filter(|row| !seen.insert(row.as_slice()))
        .count()
}

/// Inferred type of each column, for each table.
pub fn data_types(tables: &NamedTables) -> IndexMap<String, IndexMap<String, ColumnType>> {
    tables
        .iter()
        .map(|(name, table)| {
            let types = table
                .columns
                .iter()
                .map(|col| (col.name.clone(), col.column_type))
                .collect();
            (name.to_string(), types)
        })
        .collect()
}
