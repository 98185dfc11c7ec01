//! Loaded tables and their source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::schema::{convert_value, ColumnSchema, TypeInferrer, Value};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been parsed.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// A typed, in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column schemas in file order.
    pub columns: Vec<ColumnSchema>,
    /// Row data (row-major order), one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from already-typed parts.
    pub fn new(columns: Vec<ColumnSchema>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from raw strings, inferring each column's type once.
    ///
    /// Rows shorter than the header are padded with missing values and longer
    /// rows are truncated.
    pub fn from_raw(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();

        let mut inferrers = vec![TypeInferrer::new(); width];
        for row in &raw_rows {
            for (idx, inferrer) in inferrers.iter_mut().enumerate() {
                inferrer.observe(row.get(idx).map(String::as_str).unwrap_or(""));
            }
        }

        let columns: Vec<ColumnSchema> = headers
            .into_iter()
            .zip(&inferrers)
            .enumerate()
            .map(|(position, (name, inferrer))| {
                ColumnSchema::new(name, position, inferrer.finish())
            })
            .collect();

        let rows = raw_rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        let raw = row.get(col.position).map(String::as_str).unwrap_or("");
                        convert_value(raw, col.column_type)
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Schema of a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(index).unwrap_or(&Value::Null))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Tables keyed by name, in load order.
///
/// Built once by the loader and only read afterwards; every consumer receives
/// it by shared reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedTables {
    tables: IndexMap<String, Table>,
}

impl NamedTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any table already registered under the name.
    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Get a table a later step cannot do without.
    pub fn require(&self, name: &str) -> Result<&Table> {
        self.get(name)
            .ok_or_else(|| AssayError::MissingTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(String, Table)> for NamedTables {
    fn from_iter<I: IntoIterator<Item = (String, Table)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
