//! Visualize command - top-N frequency charts for every column.

use std::path::PathBuf;

use assay::visualize::TableVisualization;
use assay::{Assay, AssayConfig, VisualizationReport};
use colored::Colorize;

use super::CommandResult;
use crate::cli::ChartArgs;

pub fn run(dir: PathBuf, charts: ChartArgs, verbose: bool) -> CommandResult {
    let config = AssayConfig::default().with_visualize(charts.config());
    config.validate()?;
    let assay = Assay::with_config(config);
    let loaded = super::load_dir(&assay, &dir)?;
    super::load::print_report(&loaded, verbose);
    println!();

    let mut sink = super::chart_sink(&charts)?;
    let report = assay.visualize(loaded.tables(), sink.as_mut());

    print_summary(&report, &charts);
    Ok(())
}

pub fn print_summary(report: &VisualizationReport, charts: &ChartArgs) {
    for table in &report.tables {
        match table {
            TableVisualization::Rendered {
                table,
                skipped_columns,
                ..
            } => {
                for (column, reason) in skipped_columns {
                    println!(
                        "{} {}.{}: {}",
                        "Skipped chart".yellow(),
                        table,
                        column,
                        reason
                    );
                }
            }
            TableVisualization::Skipped { table, reason } => {
                println!("{} {}: {}", "Skipped table".yellow(), table, reason);
            }
        }
    }

    let destination = charts
        .charts_dir
        .as_ref()
        .map(|dir| format!(" to {}", dir.display()))
        .unwrap_or_default();
    println!(
        "{} {} charts{}",
        "Rendered".green().bold(),
        report.chart_count().to_string().white().bold(),
        destination
    );
}
