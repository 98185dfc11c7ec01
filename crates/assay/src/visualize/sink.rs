//! Destinations for rendered charts.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Receives each rendered chart.
pub trait ChartSink {
    fn write_chart(&mut self, table: &str, column: &str, rendered: &str) -> io::Result<()>;
}

/// Prints charts to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ChartSink for StdoutSink {
    fn write_chart(&mut self, _table: &str, _column: &str, rendered: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{rendered}")
    }
}

/// Keeps charts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// `(table, column, rendered)` in the order written.
    pub charts: Vec<(String, String, String)>,
}

impl ChartSink for MemorySink {
    fn write_chart(&mut self, table: &str, column: &str, rendered: &str) -> io::Result<()> {
        self.charts
            .push((table.to_string(), column.to_string(), rendered.to_string()));
        Ok(())
    }
}

/// Writes one `<table>__<column>.txt` file per chart.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the sink, making the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl ChartSink for DirectorySink {
    fn write_chart(&mut self, table: &str, column: &str, rendered: &str) -> io::Result<()> {
        let file = format!("{}__{}.txt", file_safe(table), file_safe(column));
        fs::write(self.dir.join(file), rendered)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
