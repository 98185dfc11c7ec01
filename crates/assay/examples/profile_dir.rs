//! Example: profile every delimited file in a directory.
//!
//! Usage:
//!   cargo run --example profile_dir -- <dir>

use std::env;
use std::path::Path;

use assay::{Assay, IntegrityStatus};

fn main() -> assay::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example profile_dir -- <dir>");
        std::process::exit(1);
    }

    let dir = Path::new(&args[1]);
    let assay = Assay::new();
    let loaded = assay.load(dir)?;

    for (file, reason) in loaded.failures() {
        println!("  failed: {} ({})", file, reason);
    }

    let report = assay.profile(loaded.tables());

    println!("## Tables");
    for (name, info) in &report.info {
        let duplicates = report.duplicate_counts.get(name).copied().unwrap_or(0);
        println!(
            "  {:24} rows={:<8} columns={:<3} duplicates={}",
            name,
            info.rows,
            info.columns.len(),
            duplicates
        );
    }
    println!();

    println!("## Key integrity");
    for check in &report.key_integrity {
        match &check.status {
            IntegrityStatus::Checked(result) => println!(
                "  {:40} {} unmatched of {}",
                check.relation.label, result.unmatched, result.checked
            ),
            other => println!("  {:40} {:?}", check.relation.label, other),
        }
    }

    Ok(())
}
