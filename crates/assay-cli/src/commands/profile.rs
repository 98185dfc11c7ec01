//! Profile command - data-quality report for every loaded table.

use std::path::PathBuf;

use assay::{Assay, IntegrityStatus, ProfileReport};
use colored::Colorize;

use super::CommandResult;

pub fn run(dir: PathBuf, json_output: bool, verbose: bool) -> CommandResult {
    let assay = Assay::new();
    let loaded = super::load_dir(&assay, &dir)?;
    let report = assay.profile(loaded.tables());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        super::load::print_report(&loaded, verbose);
        println!();
        print_report(&report, verbose);
    }

    Ok(())
}

pub fn print_report(report: &ProfileReport, verbose: bool) {
    println!("{}", "Table info:".yellow().bold());
    for (table, info) in &report.info {
        println!(
            "  {} {} rows, {} columns",
            table.white().bold(),
            info.rows,
            info.columns.len()
        );
        if verbose {
            for col in &info.columns {
                println!(
                    "    {:24} {:>8} non-null  {}",
                    col.name, col.non_null, col.column_type
                );
            }
        }
    }
    println!();

    println!("{}", "Missing values:".yellow().bold());
    for (table, columns) in &report.missing_values {
        println!("  {}", table.white().bold());
        for (column, missing) in columns {
            let count = if *missing > 0 {
                missing.to_string().red()
            } else {
                missing.to_string().green()
            };
            println!("    {:24} {}", column, count);
        }
    }
    println!();

    println!("{}", "Duplicate rows:".yellow().bold());
    for (table, duplicates) in &report.duplicate_counts {
        let count = if *duplicates > 0 {
            duplicates.to_string().red()
        } else {
            duplicates.to_string().green()
        };
        println!("  {:26} {}", table, count);
    }
    println!();

    println!("{}", "Data types:".yellow().bold());
    for (table, columns) in &report.data_types {
        println!("  {}", table.white().bold());
        for (column, column_type) in columns {
            println!("    {:24} {}", column, column_type);
        }
    }
    println!();

    println!("{}", "Summary statistics:".yellow().bold());
    for (table, columns) in &report.describe {
        if columns.is_empty() {
            continue;
        }
        println!("  {}", table.white().bold());
        for (column, s) in columns {
            let std = s.std.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "NaN".to_string());
            println!(
                "    {:24} count={} mean={:.3} std={} min={} 25%={} 50%={} 75%={} max={}",
                column, s.count, s.mean, std, s.min, s.q1, s.median, s.q3, s.max
            );
        }
    }
    println!();

    println!("{}", "Key integrity:".yellow().bold());
    for check in &report.key_integrity {
        let label = &check.relation.label;
        match &check.status {
            IntegrityStatus::Checked(result) => {
                let unmatched = if result.unmatched > 0 {
                    result.unmatched.to_string().red()
                } else {
                    result.unmatched.to_string().green()
                };
                println!(
                    "  {:40} {} of {} {} values unmatched",
                    label, unmatched, result.checked, check.relation.fk_column
                );
                if !result.sample.is_empty() {
                    println!("    e.g. {}", result.sample.join(", ").dimmed());
                }
            }
            IntegrityStatus::MissingDatasets { missing } => {
                println!(
                    "  {:40} {} {}",
                    label,
                    "missing required datasets:".yellow(),
                    missing.join(", ")
                );
            }
            IntegrityStatus::Invalid { reason } => {
                println!("  {:40} {}", label, reason.red());
            }
        }
    }
}
