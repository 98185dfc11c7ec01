//! Load command - read every delimited file and report what was loaded.

use std::path::PathBuf;

use assay::{Assay, FileOutcome, LoadReport};
use colored::Colorize;

use super::CommandResult;

pub fn run(dir: PathBuf, json_output: bool, verbose: bool) -> CommandResult {
    let assay = Assay::new();
    let report = super::load_dir(&assay, &dir)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report.outcomes)?);
    } else {
        println!(
            "{} {}",
            "Loading".cyan().bold(),
            dir.display().to_string().white()
        );
        println!();
        print_report(&report, verbose);
    }

    Ok(())
}

/// Per-file shape and columns, then failures.
pub fn print_report(report: &LoadReport, verbose: bool) {
    if report.outcomes.is_empty() {
        println!("{}", "No delimited files found".yellow());
        return;
    }

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Loaded {
                name,
                source,
                column_names,
            } => {
                println!(
                    "{} {} {}",
                    "✓ Successfully read".green(),
                    source.file.white().bold(),
                    format!("as {}", name).dimmed()
                );
                println!("  Shape:   ({}, {})", source.row_count, source.column_count);
                println!("  Columns: {}", column_names.join(", "));
                if verbose {
                    println!("  Format:  {}", source.format);
                    println!("  Size:    {} bytes", source.size_bytes);
                    println!("  SHA-256: {}", source.hash.dimmed());
                }
            }
            FileOutcome::Failed { file, reason } => {
                println!("{} {}: {}", "✗ Error reading".red(), file.white().bold(), reason);
            }
        }
    }

    println!();
    println!(
        "Loaded {} of {} files",
        report.loaded_count().to_string().white().bold(),
        report.outcomes.len()
    );
}
