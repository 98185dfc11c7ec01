//! Assay: profiling, key-integrity checks and ad-hoc queries for small
//! tabular datasets.
//!
//! A run loads every delimited file in a directory into a typed table, then
//! hands the resulting [`NamedTables`] map to three independent consumers:
//!
//! - **Profiler**: missing values, duplicate rows, column types, key
//!   integrity between tables, descriptive statistics
//! - **Visualizer**: top-N value frequency charts per column
//! - **Query runner**: a fixed set of aggregate queries over an in-memory
//!   SQLite view of the tables
//!
//! # Example
//!
//! ```no_run
//! use assay::{Assay, StdoutSink};
//!
//! let assay = Assay::new();
//! let loaded = assay.load(".").unwrap();
//! let tables = loaded.tables();
//!
//! let profile = assay.profile(tables);
//! println!("Duplicates: {:?}", profile.duplicate_counts);
//!
//! assay.visualize(tables, &mut StdoutSink);
//! let queries = assay.query(tables).unwrap();
//! println!("Queries run: {}", queries.queries.len());
//! ```

pub mod error;
pub mod input;
pub mod profile;
pub mod query;
pub mod schema;
pub mod visualize;

mod assay;

pub use crate::assay::{default_relations, Assay, AssayConfig, QueryOutcome, QueryReport};
pub use error::{AssayError, Result};
pub use input::{FileOutcome, LoadReport, Loader, NamedTables, SourceMetadata, Table};
pub use profile::{IntegrityStatus, KeyIntegrity, KeyRelation, ProfileReport};
pub use query::{
    DatasetNames, QueryDefinition, QueryParams, QueryResult, QueryRunner, StageOutcome,
};
pub use schema::{ColumnSchema, ColumnType, Value};
pub use visualize::{ChartSink, MemorySink, StdoutSink, VisualizationReport, Visualizer};
