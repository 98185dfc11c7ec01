//! CLI argument definitions using clap.

use std::path::PathBuf;

use assay::visualize::{ChartStyle, VisualizeConfig};
use assay::QueryParams;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Assay: profile, chart and query a directory of tabular datasets
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load every delimited file and report its shape
    Load {
        /// Directory holding the data files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report missing values, duplicates, column types and key integrity
    Profile {
        /// Directory holding the data files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chart the most frequent values of every column
    Visualize {
        /// Directory holding the data files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        charts: ChartArgs,
    },

    /// Run the fixed analytical query set
    Query {
        /// Directory holding the data files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        query: QueryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load, profile, visualize and query in one pass
    Run {
        /// Directory holding the data files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        charts: ChartArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Chart layout and destination.
#[derive(Args, Clone, Debug)]
pub struct ChartArgs {
    /// Number of most frequent values charted per column
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// Width of the longest bar, in characters (10-200)
    #[arg(long, default_value = "40")]
    pub width: usize,

    /// Write one .txt file per chart here instead of printing
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,
}

impl ChartArgs {
    pub fn config(&self) -> VisualizeConfig {
        VisualizeConfig {
            top_n: self.top,
            style: ChartStyle {
                width: self.width,
                ..ChartStyle::default()
            },
        }
    }
}

/// Values bound into the query set. Unset flags keep the defaults.
#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Reference date for ages (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,

    /// Minimum user age in years
    #[arg(long, value_name = "YEARS")]
    pub min_age: Option<u32>,

    /// Minimum account age in days
    #[arg(long, value_name = "DAYS")]
    pub min_account_days: Option<u32>,

    /// Rows returned by the ranking queries
    #[arg(long)]
    pub limit: Option<u32>,
}

impl QueryArgs {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::default();
        if let Some(as_of) = self.as_of {
            params = params.with_as_of(as_of);
        }
        if let Some(years) = self.min_age {
            params = params.with_min_age(years);
        }
        if let Some(days) = self.min_account_days {
            params = params.with_min_account_days(days);
        }
        if let Some(limit) = self.limit {
            params = params.with_limit(limit);
        }
        params
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e))
}
