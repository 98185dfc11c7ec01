//! Schema types for representing inferred table structure.

mod column;
mod infer;
mod types;
mod value;

pub use column::ColumnSchema;
pub use infer::{convert_value, infer_column_type, is_missing, parse_timestamp, TypeInferrer};
pub use types::ColumnType;
pub use value::{Value, MISSING_LABEL};
pub(crate) use value::TIMESTAMP_FORMAT;
