//! Referential integrity between a child foreign key and a parent key.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::input::{NamedTables, Table};

/// Number of orphaned key values kept as evidence.
const SAMPLE_LIMIT: usize = 10;

/// A declared foreign-key relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRelation {
    /// Label used in reports (e.g. `missing_product_ids_in_transactions`).
    pub label: String,
    pub child: String,
    pub fk_column: String,
    pub parent: String,
    pub pk_column: String,
}

impl KeyRelation {
    pub fn new(
        label: impl Into<String>,
        child: impl Into<String>,
        fk_column: impl Into<String>,
        parent: impl Into<String>,
        pk_column: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            child: child.into(),
            fk_column: fk_column.into(),
            parent: parent.into(),
            pk_column: pk_column.into(),
        }
    }

    /// The same relationship checked in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            label: format!("{}_reversed", self.label),
            child: self.parent.clone(),
            fk_column: self.pk_column.clone(),
            parent: self.child.clone(),
            pk_column: self.fk_column.clone(),
        }
    }

    /// Tables this relation needs that are not in `tables`.
    pub fn missing_tables(&self, tables: &NamedTables) -> Vec<String> {
        [&self.child, &self.parent]
            .into_iter()
            .filter(|name| !tables.contains(name))
            .cloned()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Outcome of one key-integrity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyIntegrity {
    /// Distinct non-missing child key values with no parent match.
    pub unmatched: usize,
    /// Distinct non-missing child key values checked.
    pub checked: usize,
    /// First few unmatched values, in encounter order.
    pub sample: Vec<String>,
}

/// Count distinct foreign-key values in the child with no matching parent key.
///
/// Missing keys on either side are ignored: they are neither matched nor
/// unmatched. Fails when either table or column is absent.
pub fn key_integrity(tables: &NamedTables, relation: &KeyRelation) -> Result<KeyIntegrity> {
    let child = tables.require(&relation.child)?;
    let parent = tables.require(&relation.parent)?;

    let fk = column_position(child, &relation.child, &relation.fk_column)?;
    let pk = column_position(parent, &relation.parent, &relation.pk_column)?;

    let parent_keys: HashSet<String> = parent.column_values(pk).filter_map(|v| v.key()).collect();
    let child_keys: IndexSet<String> = child.column_values(fk).filter_map(|v| v.key()).collect();

    let unmatched: Vec<&String> = child_keys
        .iter()
        .filter(|key| !parent_keys.contains(*key))
        .collect();

    Ok(KeyIntegrity {
        unmatched: unmatched.len(),
        checked: child_keys.len(),
        sample: unmatched
            .into_iter()
            .take(SAMPLE_LIMIT)
            .cloned()
            .collect(),
    })
}

fn column_position(table: &Table, table_name: &str, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| AssayError::MissingColumn {
            table: table_name.to_string(),
            column: column.to_string(),
        })
}
