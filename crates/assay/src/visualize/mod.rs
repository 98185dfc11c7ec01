//! Top-N frequency charts for every column of every table.

mod chart;
mod frequency;
mod sink;

pub use chart::{Bar, BarChart, ChartStyle, MAX_BAR_WIDTH, MIN_BAR_WIDTH};
pub use frequency::{top_values, Frequency};
pub use sink::{ChartSink, DirectorySink, MemorySink, StdoutSink};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AssayError, Result};
use crate::input::{NamedTables, Table};

/// Visualizer configuration.
#[derive(Debug, Clone)]
pub struct VisualizeConfig {
    /// Number of most frequent values charted per column.
    pub top_n: usize,
    pub style: ChartStyle,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            style: ChartStyle::default(),
        }
    }
}

/// What the visualizer did with one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableVisualization {
    Rendered {
        table: String,
        charts: Vec<String>,
        /// `(column, reason)` for columns that could not be charted.
        skipped_columns: Vec<(String, String)>,
    },
    Skipped {
        table: String,
        reason: String,
    },
}

/// Per-table outcomes of a visualization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizationReport {
    pub tables: Vec<TableVisualization>,
}

impl VisualizationReport {
    /// Total number of charts written.
    pub fn chart_count(&self) -> usize {
        self.tables
            .iter()
            .map(|t| match t {
                TableVisualization::Rendered { charts, .. } => charts.len(),
                TableVisualization::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Builds and renders frequency charts.
pub struct Visualizer {
    config: VisualizeConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self::with_config(VisualizeConfig::default())
    }

    pub fn with_config(config: VisualizeConfig) -> Self {
        Self { config }
    }

    /// Chart the top values of each column of each table.
    ///
    /// Display only: an empty table, a chart that cannot be rendered or a
    /// sink that fails to write is logged and skipped, never returned as an
    /// error.
    pub fn visualize(&self, tables: &NamedTables, sink: &mut dyn ChartSink) -> VisualizationReport {
        let mut report = VisualizationReport::default();

        for (name, table) in tables.iter() {
            info!(table = %name, "Visualizing");

            if table.is_empty() {
                warn!(table = %name, "Table is empty. Skipping.");
                report.tables.push(TableVisualization::Skipped {
                    table: name.to_string(),
                    reason: "table has no rows".to_string(),
                });
                continue;
            }

            let mut charts = Vec::new();
            let mut skipped_columns = Vec::new();
            for col in &table.columns {
                let written = self
                    .column_chart(name, table, col.position)
                    .and_then(|rendered| {
                        sink.write_chart(name, &col.name, &rendered)
                            .map_err(|e| AssayError::Render(e.to_string()))
                    });
                match written {
                    Ok(()) => charts.push(col.name.clone()),
                    Err(e) => {
                        warn!(table = %name, column = %col.name, error = %e, "Chart skipped");
                        skipped_columns.push((col.name.clone(), e.to_string()));
                    }
                }
            }

            info!(table = %name, charts = charts.len(), "Finished visualizing");
            report.tables.push(TableVisualization::Rendered {
                table: name.to_string(),
                charts,
                skipped_columns,
            });
        }

        report
    }

    /// Frequency chart for one column.
    pub fn chart(&self, table_name: &str, table: &Table, column: usize) -> BarChart {
        let column_name = table
            .columns
            .get(column)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        let title = format!(
            "Top {} Frequent Values in '{}' - {}",
            self.config.top_n, column_name, table_name
        );

        top_values(table, column, self.config.top_n)
            .into_iter()
            .fold(BarChart::new(title), |chart, freq| {
                chart.with_bar(freq.label(), freq.count)
            })
    }

    fn column_chart(&self, table_name: &str, table: &Table, column: usize) -> Result<String> {
        self.chart(table_name, table, column).render(self.config.style)
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, ColumnType};

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::from_raw(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_empty_table_is_skipped_others_rendered() {
        let empty = Table::new(vec![ColumnSchema::new("ID", 0, ColumnType::Text)], Vec::new());
        let tables = NamedTables::new()
            .with_table("empty", empty)
            .with_table("users", make_table(vec!["ID", "STATE"], vec![vec!["1", "WI"]]));

        let mut sink = MemorySink::default();
        let report = Visualizer::new().visualize(&tables, &mut sink);

        assert!(matches!(&report.tables[0], TableVisualization::Skipped { table, .. } if table == "empty"));
        assert_eq!(report.chart_count(), 2);
        assert!(sink.charts.iter().all(|(table, _, _)| table == "users"));
    }

    #[test]
    fn test_render_failure_skips_column() {
        let config = VisualizeConfig {
            top_n: 5,
            style: ChartStyle {
                width: 1,
                label_width: 10,
            },
        };
        let tables = NamedTables::new().with_table("t", make_table(vec!["a"], vec![vec!["x"]]));

        let mut sink = MemorySink::default();
        let report = Visualizer::with_config(config).visualize(&tables, &mut sink);

        assert!(sink.charts.is_empty());
        match &report.tables[0] {
            TableVisualization::Rendered { skipped_columns, .. } => {
                assert_eq!(skipped_columns.len(), 1)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    /// Refuses charts for one column and keeps the rest.
    struct RefusingSink {
        refuse: &'static str,
        inner: MemorySink,
    }

    impl ChartSink for RefusingSink {
        fn write_chart(&mut self, table: &str, column: &str, rendered: &str) -> std::io::Result<()> {
            if column == self.refuse {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.inner.write_chart(table, column, rendered)
        }
    }

    #[test]
    fn test_sink_failure_skips_column() {
        let tables = NamedTables::new().with_table(
            "users",
            make_table(vec!["ID", "STATE", "GENDER"], vec![vec!["1", "WI", "female"]]),
        );
        let mut sink = RefusingSink {
            refuse: "STATE",
            inner: MemorySink::default(),
        };

        let report = Visualizer::new().visualize(&tables, &mut sink);

        assert_eq!(report.chart_count(), 2);
        let written: Vec<&str> = sink.inner.charts.iter().map(|(_, col, _)| col.as_str()).collect();
        assert_eq!(written, vec!["ID", "GENDER"]);
        match &report.tables[0] {
            TableVisualization::Rendered {
                charts,
                skipped_columns,
                ..
            } => {
                assert_eq!(charts, &vec!["ID".to_string(), "GENDER".to_string()]);
                assert_eq!(skipped_columns.len(), 1);
                assert_eq!(skipped_columns[0].0, "STATE");
                assert!(skipped_columns[0].1.contains("read-only"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_chart_title_and_bars() {
        let table = make_table(vec!["BRAND"], vec![vec!["A"], vec![""], vec!["A"]]);
        let chart = Visualizer::new().chart("products", &table, 0);

        assert_eq!(chart.title, "Top 5 Frequent Values in 'BRAND' - products");
        assert_eq!(chart.bars[0].label, "A");
        assert_eq!(chart.bars[1].label, "NaN");
    }
}
