//! Data-quality profiling over loaded tables.
//!
//! Every operation here is stateless and reads the [`NamedTables`] map it is
//! handed; none of them depend on each other's output.
//!
//! [`NamedTables`]: crate::input::NamedTables

mod integrity;
mod quality;
mod report;
mod summary;

pub use integrity::{key_integrity, KeyIntegrity, KeyRelation};
pub use quality::{count_duplicate_rows, data_types, duplicate_count, missing_values};
pub use report::{IntegrityCheck, IntegrityStatus, ProfileReport};
pub use summary::{describe, info, ColumnInfo, NumericSummary, TableInfo};
