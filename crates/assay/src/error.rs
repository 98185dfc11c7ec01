//! Error types for the assay library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Error reading or accessing a file or directory.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data rows.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A step needed a table that was never loaded.
    #[error("Missing table: '{0}' was not loaded")]
    MissingTable(String),

    /// A table exists but lacks a column a step depends on.
    #[error("Missing column: table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Error from the in-memory relational engine.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Chart could not be rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;
