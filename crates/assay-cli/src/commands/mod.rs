//! CLI command implementations.

pub mod load;
pub mod profile;
pub mod query;
pub mod run;
pub mod visualize;

use std::path::Path;

use assay::visualize::DirectorySink;
use assay::{Assay, ChartSink, LoadReport, StdoutSink};

use crate::cli::ChartArgs;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load `dir`, failing only when it is not a directory at all.
fn load_dir(assay: &Assay, dir: &Path) -> Result<LoadReport, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }
    Ok(assay.load(dir)?)
}

/// Chart destination: a directory when requested, stdout otherwise.
fn chart_sink(charts: &ChartArgs) -> Result<Box<dyn ChartSink>, Box<dyn std::error::Error>> {
    match &charts.charts_dir {
        Some(dir) => Ok(Box::new(DirectorySink::create(dir)?)),
        None => Ok(Box::new(StdoutSink)),
    }
}
