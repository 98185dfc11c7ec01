//! Main Assay struct and public API.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AssayError, Result};
use crate::input::{LoadReport, Loader, LoaderConfig, NamedTables};
use crate::profile::{KeyRelation, ProfileReport};
use crate::query::{
    standard_queries, DatasetNames, QueryParams, QueryResult, QueryRunner, StageOutcome,
};
use crate::visualize::{
    ChartSink, VisualizationReport, VisualizeConfig, Visualizer, MAX_BAR_WIDTH, MIN_BAR_WIDTH,
};

/// Configuration for a run.
#[derive(Debug, Clone)]
pub struct AssayConfig {
    /// Loader configuration.
    pub loader: LoaderConfig,
    /// Names of the conventional tables.
    pub datasets: DatasetNames,
    /// Relations checked for key integrity.
    pub relations: Vec<KeyRelation>,
    /// Chart settings.
    pub visualize: VisualizeConfig,
    /// Values bound into the query set.
    pub query: QueryParams,
}

impl Default for AssayConfig {
    fn default() -> Self {
        let datasets = DatasetNames::default();
        let relations = default_relations(&datasets);
        Self {
            loader: LoaderConfig::default(),
            datasets,
            relations,
            visualize: VisualizeConfig::default(),
            query: QueryParams::default(),
        }
    }
}

impl AssayConfig {
    /// Replace the dataset names and re-derive the default relations.
    pub fn with_datasets(mut self, datasets: DatasetNames) -> Self {
        self.relations = default_relations(&datasets);
        self.datasets = datasets;
        self
    }

    pub fn with_relations(mut self, relations: Vec<KeyRelation>) -> Self {
        self.relations = relations;
        self
    }

    pub fn with_visualize(mut self, visualize: VisualizeConfig) -> Self {
        self.visualize = visualize;
        self
    }

    pub fn with_query_params(mut self, params: QueryParams) -> Self {
        self.query = params;
        self
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.loader.extensions.is_empty() {
            return Err(AssayError::Config("no file extensions to load".to_string()));
        }
        if self.visualize.top_n == 0 {
            return Err(AssayError::Config("top must be at least 1".to_string()));
        }
        let width = self.visualize.style.width;
        if !(MIN_BAR_WIDTH..=MAX_BAR_WIDTH).contains(&width) {
            return Err(AssayError::Config(format!(
                "chart width {} is outside {}..={}",
                width, MIN_BAR_WIDTH, MAX_BAR_WIDTH
            )));
        }
        if self.query.limit == 0 {
            return Err(AssayError::Config("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Transactions reference products by barcode and users by id.
pub fn default_relations(datasets: &DatasetNames) -> Vec<KeyRelation> {
    vec![
        KeyRelation::new(
            "missing_product_ids_in_transactions",
            &datasets.transactions,
            "BARCODE",
            &datasets.products,
            "BARCODE",
        ),
        KeyRelation::new(
            "missing_user_ids_in_transactions",
            &datasets.transactions,
            "USER_ID",
            &datasets.users,
            "ID",
        ),
    ]
}

/// Outcome of one query in the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Completed(QueryResult),
    Failed { name: String, error: String },
}

/// Outcomes of the full query set, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryReport {
    /// Relations staged before the queries ran.
    pub staging: Vec<StageOutcome>,
    pub queries: Vec<QueryOutcome>,
}

impl QueryReport {
    /// A successful result by query name.
    pub fn result(&self, name: &str) -> Option<&QueryResult> {
        self.queries.iter().find_map(|outcome| match outcome {
            QueryOutcome::Completed(result) if result.name == name => Some(result),
            _ => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.queries
            .iter()
            .filter(|o| matches!(o, QueryOutcome::Failed { .. }))
            .count()
    }
}

/// The main entry point: load, profile, visualize, query.
pub struct Assay {
    config: AssayConfig,
    loader: Loader,
    visualizer: Visualizer,
}

impl Assay {
    /// Create an instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(AssayConfig::default())
    }

    /// Create an instance with custom configuration.
    pub fn with_config(config: AssayConfig) -> Self {
        let loader = Loader::with_config(config.loader.clone());
        let visualizer = Visualizer::with_config(config.visualize.clone());
        Self {
            config,
            loader,
            visualizer,
        }
    }

    pub fn config(&self) -> &AssayConfig {
        &self.config
    }

    /// Load every delimited file in `dir`.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<LoadReport> {
        self.loader.load_dir(dir)
    }

    /// Profile the tables and check the configured relations.
    pub fn profile(&self, tables: &NamedTables) -> ProfileReport {
        ProfileReport::build(tables, &self.config.relations)
    }

    /// Chart the top values of every column.
    pub fn visualize(&self, tables: &NamedTables, sink: &mut dyn ChartSink) -> VisualizationReport {
        self.visualizer.visualize(tables, sink)
    }

    /// Stage the tables and run the query set.
    ///
    /// The database lives only for this call and is closed whatever the
    /// queries return. Errors opening or closing the database fail the call.
    /// A table that cannot be staged, or a failing query, is recorded and the
    /// rest still run.
    pub fn query(&self, tables: &NamedTables) -> Result<QueryReport> {
        for name in [
            &self.config.datasets.transactions,
            &self.config.datasets.products,
            &self.config.datasets.users,
        ] {
            if !tables.contains(name) {
                warn!(table = %name, "Expected dataset not loaded; dependent queries will fail");
            }
        }

        let mut runner = QueryRunner::open_in_memory()?;
        let staging = runner.stage(tables, &self.config.datasets);
        info!(
            staged = staging.iter().filter(|o| o.is_staged()).count(),
            failed = staging.iter().filter(|o| !o.is_staged()).count(),
            "Staged tables"
        );
        let queries = standard_queries(&self.config.datasets, &self.config.query);
        let outcomes = runner.run_all(&queries);
        runner.close()?;

        let queries = outcomes
            .into_iter()
            .map(|(name, result)| match result {
                Ok(result) => QueryOutcome::Completed(result),
                Err(e) => QueryOutcome::Failed {
                    name,
                    error: e.to_string(),
                },
            })
            .collect();

        Ok(QueryReport { staging, queries })
    }
}

impl Default for Assay {
    fn default() -> Self {
        Self::new()
    }
}
