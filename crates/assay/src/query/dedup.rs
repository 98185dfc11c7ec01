//! Receipt-level deduplication of transaction lines.
//!
//! Transaction exports repeat a line when a receipt is re-scanned, often
//! once with the quantity and once with the sale filled in. Lines are grouped
//! on their identifying columns and the maximum quantity and sale per group
//! is kept.

use indexmap::IndexMap;

use crate::error::{AssayError, Result};
use crate::input::Table;
use crate::schema::{ColumnSchema, ColumnType, Value};

/// Columns that identify one transaction line, in output order.
pub const IDENTIFYING_COLUMNS: &[&str] = &[
    "RECEIPT_ID",
    "PURCHASE_DATE",
    "SCAN_DATE",
    "STORE_NAME",
    "USER_ID",
    "BARCODE",
];

pub const QUANTITY_COLUMN: &str = "FINAL_QUANTITY";
pub const SALE_COLUMN: &str = "FINAL_SALE";

/// Read a quantity cell as whole units.
///
/// The text sentinel `zero` is 0; fractional quantities round to the nearest
/// unit, halves away from zero. Anything unparseable is missing.
pub fn normalize_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) => Some(f.round() as i64),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("zero") {
                Some(0)
            } else {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            }
        }
        Value::Null | Value::Boolean(_) | Value::Timestamp(_) => None,
    }
}

/// Read a sale amount cell; blank or unparseable amounts are missing.
pub fn normalize_sale(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Null | Value::Boolean(_) | Value::Timestamp(_) => None,
    }
}

/// Collapse repeated transaction lines into one row per identifying key.
///
/// Output columns are the identifying columns present in `table` followed by
/// `FINAL_QUANTITY` (integer) and `FINAL_SALE` (float). Groups keep the order
/// of their first line.
pub fn dedup_receipts(table: &Table) -> Result<Table> {
    let key_columns: Vec<&ColumnSchema> = IDENTIFYING_COLUMNS
        .iter()
        .filter_map(|name| table.column(name))
        .collect();
    if key_columns.is_empty() {
        return Err(missing_column(IDENTIFYING_COLUMNS[0]));
    }
    let quantity = table
        .column_index(QUANTITY_COLUMN)
        .ok_or_else(|| missing_column(QUANTITY_COLUMN))?;
    let sale = table
        .column_index(SALE_COLUMN)
        .ok_or_else(|| missing_column(SALE_COLUMN))?;

    let mut groups: IndexMap<Vec<Value>, (Option<i64>, Option<f64>)> = IndexMap::new();
    for row in &table.rows {
        let key: Vec<Value> = key_columns
            .iter()
            .map(|col| cell(row, col.position).clone())
            .collect();
        let entry = groups.entry(key).or_insert((None, None));
        entry.0 = entry.0.max(normalize_quantity(cell(row, quantity)));
        entry.1 = max_f64(entry.1, normalize_sale(cell(row, sale)));
    }

    let mut columns: Vec<ColumnSchema> = key_columns
        .iter()
        .enumerate()
        .map(|(position, col)| ColumnSchema::new(col.name.clone(), position, col.column_type))
        .collect();
    let width = columns.len();
    columns.push(ColumnSchema::new(QUANTITY_COLUMN, width, ColumnType::Integer));
    columns.push(ColumnSchema::new(SALE_COLUMN, width + 1, ColumnType::Float));

    let rows = groups
        .into_iter()
        .map(|(mut key, (qty, amount))| {
            key.push(qty.map_or(Value::Null, Value::Integer));
            key.push(amount.map_or(Value::Null, Value::Float));
            key
        })
        .collect();

    Ok(Table::new(columns, rows))
}

/// Cells past the end of a short row read as missing.
fn cell(row: &[Value], index: usize) -> &Value {
    row.get(index).unwrap_or(&Value::Null)
}

fn max_f64(current: Option<f64>, next: Option<f64>) -> Option<f64> {
    match (current, next) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn missing_column(column: &str) -> AssayError {
    AssayError::MissingColumn {
        table: "transactions".to_string(),
        column: column.to_string(),
    }
}
