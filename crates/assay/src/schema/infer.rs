//! Column type inference, applied once when a table is loaded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::ColumnType;
use super::value::Value;

// Every accepted timestamp starts with an ISO date.
static ISO_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

/// Tokens read as missing values (compared case-insensitively after trimming).
const MISSING_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "#na", "<na>",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Check if a raw cell represents a missing value.
pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Parse a date or date-time, normalizing offsets to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if !ISO_DATE_PREFIX.is_match(trimmed) {
        return None;
    }

    // "2024-08-21 14:19:06.539 Z" and "...Z" are both UTC
    let utc = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .map(str::trim_end);
    if let Some(naive) = utc {
        return parse_naive(naive);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.naive_utc());
        }
    }

    parse_naive(trimmed)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Infers the storage type of a column from its raw cells.
///
/// A type is chosen only when every non-missing cell fits it, checked from
/// the narrowest type outwards. Integers mixed with decimals widen to float;
/// anything that fits nothing is text.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut inferrer = TypeInferrer::new();
    for value in values {
        inferrer.observe(value);
    }
    inferrer.finish()
}

/// Single-pass accumulator behind [`infer_column_type`].
#[derive(Debug, Clone)]
pub struct TypeInferrer {
    seen: usize,
    all_bool: bool,
    all_int: bool,
    all_float: bool,
    all_timestamp: bool,
}

impl TypeInferrer {
    pub fn new() -> Self {
        Self {
            seen: 0,
            all_bool: true,
            all_int: true,
            all_float: true,
            all_timestamp: true,
        }
    }

    /// Record one raw cell. Missing cells are ignored.
    pub fn observe(&mut self, raw: &str) {
        if is_missing(raw) {
            return;
        }
        self.seen += 1;

        if self.all_bool && parse_bool(raw).is_none() {
            self.all_bool = false;
        }
        if self.all_int && raw.trim().parse::<i64>().is_err() {
            self.all_int = false;
        }
        if self.all_float && parse_float(raw).is_none() {
            self.all_float = false;
        }
        if self.all_timestamp && parse_timestamp(raw).is_none() {
            self.all_timestamp = false;
        }
    }

    pub fn finish(&self) -> ColumnType {
        if self.seen == 0 {
            ColumnType::Text
        } else if self.all_bool {
            ColumnType::Boolean
        } else if self.all_int {
            ColumnType::Integer
        } else if self.all_float {
            ColumnType::Float
        } else if self.all_timestamp {
            ColumnType::Timestamp
        } else {
            ColumnType::Text
        }
    }
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a raw cell into a value of the column's inferred type.
pub fn convert_value(raw: &str, column_type: ColumnType) -> Value {
    if is_missing(raw) {
        return Value::Null;
    }
    let converted = match column_type {
        ColumnType::Text => None,
        ColumnType::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
        ColumnType::Float => parse_float(raw).map(Value::Float),
        ColumnType::Boolean => parse_bool(raw).map(Value::Boolean),
        ColumnType::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
    };
    converted.unwrap_or_else(|| Value::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("NA"));
        assert!(is_missing("nan"));
        assert!(is_missing("NULL"));
        assert!(is_missing("None"));
        assert!(is_missing("#N/A"));
        assert!(!is_missing("zero"));
        assert!(!is_missing("0"));
        assert!(!is_missing("-"));
    }

    #[test]
    fn test_infer_integer_type() {
        assert_eq!(infer_column_type(["1", "2", "", "100"]), ColumnType::Integer);
    }

    #[test]
    fn test_infer_float_type() {
        assert_eq!(infer_column_type(["1", "2.5", "3.14"]), ColumnType::Float);
    }

    #[test]
    fn test_text_sentinel_keeps_column_text() {
        assert_eq!(infer_column_type(["1.00", "zero", "2.00"]), ColumnType::Text);
    }

    #[test]
    fn test_infer_boolean_type() {
        assert_eq!(infer_column_type(["true", "FALSE", "True"]), ColumnType::Boolean);
    }

    #[test]
    fn test_infer_timestamp_type() {
        let values = [
            "2024-08-21 14:19:06.539 Z",
            "1970-01-01 00:00:00.000 Z",
            "2000-04-03",
        ];
        assert_eq!(infer_column_type(values), ColumnType::Timestamp);
    }

    #[test]
    fn test_all_missing_is_text() {
        assert_eq!(infer_column_type(["", "NA"]), ColumnType::Text);
    }

    #[test]
    fn test_parse_timestamp_offsets() {
        let utc = parse_timestamp("2024-01-02 03:04:05 Z").unwrap();
        let offset = parse_timestamp("2024-01-02T05:04:05+02:00").unwrap();
        assert_eq!(utc, offset);
        assert!(parse_timestamp("01/02/2024").is_none());
    }

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value("42", ColumnType::Integer), Value::Integer(42));
        assert_eq!(convert_value("", ColumnType::Integer), Value::Null);
        assert_eq!(
            convert_value("zero", ColumnType::Text),
            Value::Text("zero".to_string())
        );
    }
}
