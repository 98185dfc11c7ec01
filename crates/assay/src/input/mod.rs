//! Input parsing, typed tables and directory loading.

mod loader;
mod parser;
mod source;

pub use loader::{FileOutcome, LoadReport, Loader, LoaderConfig};
pub use parser::{Parser, ParserConfig};
pub use source::{NamedTables, SourceMetadata, Table};
