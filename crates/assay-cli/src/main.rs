//! Assay CLI - profile, chart and query a directory of tabular datasets.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Load { dir, json } => commands::load::run(dir, json, cli.verbose),

        Commands::Profile { dir, json } => commands::profile::run(dir, json, cli.verbose),

        Commands::Visualize { dir, charts } => commands::visualize::run(dir, charts, cli.verbose),

        Commands::Query { dir, query, json } => {
            commands::query::run(dir, query, json, cli.verbose)
        }

        Commands::Run {
            dir,
            charts,
            query,
            json,
        } => commands::run::run(dir, charts, query, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for reports and JSON.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
