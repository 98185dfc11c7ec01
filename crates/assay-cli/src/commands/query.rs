//! Query command - stage the tables and run the analytical query set.

use std::path::PathBuf;

use assay::{Assay, AssayConfig, QueryOutcome, QueryReport, StageOutcome};
use colored::Colorize;

use super::CommandResult;
use crate::cli::QueryArgs;

pub fn run(dir: PathBuf, query: QueryArgs, json_output: bool, verbose: bool) -> CommandResult {
    let config = AssayConfig::default().with_query_params(query.params());
    config.validate()?;
    let assay = Assay::with_config(config);
    let loaded = super::load_dir(&assay, &dir)?;
    let report = assay.query(loaded.tables())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        super::load::print_report(&loaded, verbose);
        println!();
        print_report(&report, verbose);
    }

    Ok(())
}

pub fn print_report(report: &QueryReport, verbose: bool) {
    let mut printed = false;
    for outcome in &report.staging {
        match outcome {
            StageOutcome::Staged { relation, rows } if verbose => {
                println!("Loaded {} rows into SQL table '{}'", rows, relation);
            }
            StageOutcome::Staged { .. } => continue,
            StageOutcome::Failed { relation, error } => {
                println!("{} '{}': {}", "✗ Could not stage".red(), relation, error);
            }
        }
        printed = true;
    }
    if printed {
        println!();
    }

    for outcome in &report.queries {
        match outcome {
            QueryOutcome::Completed(result) => {
                println!("{}", result.name.cyan().bold());
                if verbose {
                    println!("{}", result.description.dimmed());
                }
                println!("{}", result.render());
            }
            QueryOutcome::Failed { name, error } => {
                println!("{}", name.cyan().bold());
                println!("{} {}", "✗ Query failed:".red(), error);
            }
        }
        println!();
    }

    let failed = report.failed_count();
    if failed > 0 {
        println!(
            "{} of {} queries failed",
            failed.to_string().red().bold(),
            report.queries.len()
        );
    }
}
