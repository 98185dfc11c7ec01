//! Column schema definition.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
    /// Inferred data type.
    pub column_type: ColumnType,
}

impl ColumnSchema {
    /// Create a new column schema.
    pub fn new(name: impl Into<String>, position: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            position,
            column_type,
        }
    }
}
