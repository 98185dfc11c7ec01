//! Ad-hoc analytical queries over an in-memory relational view of the tables.

mod dedup;
mod definitions;
mod result;
mod staging;

pub use dedup::{
    dedup_receipts, normalize_quantity, normalize_sale, IDENTIFYING_COLUMNS, QUANTITY_COLUMN,
    SALE_COLUMN,
};
pub use definitions::{standard_queries, DatasetNames, QueryDefinition, QueryParam, QueryParams};
pub use result::QueryResult;
pub use staging::{dedup_relation_name, quote_ident, relation_name, QueryRunner, StageOutcome};
