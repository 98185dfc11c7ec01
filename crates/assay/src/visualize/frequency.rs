//! Value frequency ranking.

use indexmap::IndexMap;
use serde::Serialize;

use crate::input::Table;
use crate::schema::Value;

/// How often one distinct value occurs in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    /// The value, `Null` standing for the missing-value category.
    pub value: Value,
    pub count: usize,
}

impl Frequency {
    pub fn is_missing(&self) -> bool {
        self.value.is_null()
    }

    /// Chart label for the value.
    pub fn label(&self) -> String {
        self.value.to_string()
    }
}

/// The `n` most frequent values in a column, missing values included.
///
/// Ranked by descending count; equal counts keep the order in which the
/// values were first encountered.
pub fn top_values(table: &Table, column: usize, n: usize) -> Vec<Frequency> {
    let mut counts: IndexMap<&Value, usize> = IndexMap::new();
    for value in table.column_values(column) {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut ranked: Vec<Frequency> = counts
        .into_iter()
        .map(|(value, count)| Frequency {
            value: value.clone(),
            count,
        })
        .collect();
    // stable: ties stay in encounter order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
