//! Shape and descriptive statistics for each table.

use indexmap::IndexMap;
use serde::Serialize;

use crate::input::{NamedTables, Table};
use crate::schema::ColumnType;

/// Shape of a table and the fill level of each column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub column_type: ColumnType,
}

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    pub max: f64,
}

/// Shape and non-null counts for each table.
pub fn info(tables: &NamedTables) -> IndexMap<String, TableInfo> {
    tables
        .iter()
        .map(|(name, table)| (name.to_string(), table_info(table)))
        .collect()
}

fn table_info(table: &Table) -> TableInfo {
    let columns = table
        .columns
        .iter()
        .map(|col| ColumnInfo {
            name: col.name.clone(),
            non_null: table
                .column_values(col.position)
                .filter(|v| !v.is_null())
                .count(),
            column_type: col.column_type,
        })
        .collect();

    TableInfo {
        rows: table.row_count(),
        columns,
    }
}

/// Descriptive statistics for every numeric column with at least one value.
pub fn describe(tables: &NamedTables) -> IndexMap<String, IndexMap<String, NumericSummary>> {
    tables
        .iter()
        .map(|(name, table)| {
            let summaries = table
                .columns
                .iter()
                .filter(|col| col.column_type.is_numeric())
                .filter_map(|col| {
                    let values: Vec<f64> = table
                        .column_values(col.position)
                        .filter_map(|v| v.as_f64())
                        .collect();
                    summarize(values).map(|s| (col.name.clone(), s))
                })
                .collect();
            (name.to_string(), summaries)
        })
        .collect()
}

/// Welford accumulator for mean and variance in a single pass.
#[derive(Debug, Default)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn sample_std(&self) -> Option<f64> {
        (self.count >= 2).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

fn summarize(mut values: Vec<f64>) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let mut stats = RunningStats::default();
    for &v in &values {
        stats.add(v);
    }

    values.sort_by(|a, b| a.total_cmp(b));

    Some(NumericSummary {
        count: values.len(),
        mean: stats.mean,
        std: stats.sample_std(),
        min: values[0],
        q1: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q3: percentile(&values, 0.75),
        max: values[values.len() - 1],
    })
}

/// Linear-interpolated percentile over sorted, non-empty values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
