//! Run command - load, profile, visualize and query in one pass.

use std::path::PathBuf;

use assay::{Assay, AssayConfig, ChartSink, MemorySink};
use colored::Colorize;

use super::CommandResult;
use crate::cli::{ChartArgs, QueryArgs};

pub fn run(
    dir: PathBuf,
    charts: ChartArgs,
    query: QueryArgs,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    let config = AssayConfig::default()
        .with_visualize(charts.config())
        .with_query_params(query.params());
    config.validate()?;
    let assay = Assay::with_config(config);

    let loaded = super::load_dir(&assay, &dir)?;
    let tables = loaded.tables();

    if json_output {
        // Charts on stdout would corrupt the JSON.
        let mut sink: Box<dyn ChartSink> = if charts.charts_dir.is_some() {
            super::chart_sink(&charts)?
        } else {
            Box::new(MemorySink::default())
        };
        let profile = assay.profile(tables);
        let visualization = assay.visualize(tables, sink.as_mut());
        let queries = assay.query(tables)?;

        let output = serde_json::json!({
            "load": loaded.outcomes,
            "profile": profile,
            "visualization": visualization,
            "queries": queries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Assaying".cyan().bold(),
        dir.display().to_string().white()
    );
    println!();
    super::load::print_report(&loaded, verbose);
    println!();

    let profile = assay.profile(tables);
    super::profile::print_report(&profile, verbose);
    println!();

    let mut sink = super::chart_sink(&charts)?;
    let visualization = assay.visualize(tables, sink.as_mut());
    super::visualize::print_summary(&visualization, &charts);
    println!();

    let queries = assay.query(tables)?;
    super::query::print_report(&queries, verbose);

    if profile.is_degraded() || queries.failed_count() > 0 {
        println!(
            "{}",
            "Some checks could not run; see the messages above.".yellow()
        );
    }

    Ok(())
}
