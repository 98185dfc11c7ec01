//! Directory discovery and partial-failure tolerant loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::parser::{Parser, ParserConfig};
use super::source::{NamedTables, SourceMetadata, Table};
use crate::error::{AssayError, Result};

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// File extensions (lowercase, without dot) considered tabular.
    pub extensions: Vec<String>,
    /// Parser configuration applied to every file.
    pub parser: ParserConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string(), "tsv".to_string()],
            parser: ParserConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Also treat files with `extension` as tabular (e.g. `txt`).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into().trim_start_matches('.').to_lowercase();
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
        self
    }
}

/// What happened to one candidate file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Loaded {
        /// Name the table is registered under.
        name: String,
        source: SourceMetadata,
        column_names: Vec<String>,
    },
    Failed {
        file: String,
        reason: String,
    },
}

impl FileOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FileOutcome::Loaded { .. })
    }
}

/// Aggregated result of loading a directory.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Per-file outcomes in discovery order.
    pub outcomes: Vec<FileOutcome>,
    tables: NamedTables,
}

impl LoadReport {
    /// The successfully loaded tables.
    pub fn tables(&self) -> &NamedTables {
        &self.tables
    }

    pub fn into_tables(self) -> NamedTables {
        self.tables
    }

    /// Get a table a later step cannot do without.
    pub fn require(&self, name: &str) -> Result<&Table> {
        self.tables.require(name)
    }

    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_loaded()).count()
    }

    /// Failed files with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { file, reason } => Some((file.as_str(), reason.as_str())),
            FileOutcome::Loaded { .. } => None,
        })
    }
}

/// Discovers and loads delimited files.
pub struct Loader {
    config: LoaderConfig,
    parser: Parser,
}

impl Loader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self { config, parser }
    }

    /// Load every candidate file in `dir`.
    ///
    /// A file that fails to parse is recorded and skipped; only an unreadable
    /// directory fails the call.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<LoadReport> {
        let dir = dir.as_ref();
        let candidates = self.discover(dir)?;

        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut tables = NamedTables::new();

        for path in candidates {
            let file = file_name(&path);
            match self.load_file(&path) {
                Ok((table, source)) => {
                    let name = table_name(&path);
                    info!(
                        file = %file,
                        table = %name,
                        rows = source.row_count,
                        columns = source.column_count,
                        "Successfully read"
                    );
                    let column_names: Vec<String> = table.column_names().into_iter().map(String::from).collect();
                    tables.insert(name.clone(), table);
                    outcomes.push(FileOutcome::Loaded {
                        name,
                        source,
                        column_names,
                    });
                }
                Err(e) => {
                    warn!(file = %file, error = %e, "Error reading file");
                    outcomes.push(FileOutcome::Failed {
                        file,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(LoadReport { outcomes, tables })
    }

    /// Parse a single file. Empty files are an error, never a silent skip.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        if !self.is_candidate(path) {
            return Err(AssayError::UnsupportedFormat(format!(
                "'{}' is not one of: {}",
                file_name(path),
                self.config.extensions.join(", ")
            )));
        }
        self.parser.parse_file(path)
    }

    /// Candidate files sorted by name.
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let io_err = |source| AssayError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && self.is_candidate(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| *e == ext))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Name a table is registered under: the file name without extension.
pub(crate) fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_strips_extension() {
        assert_eq!(
            table_name(Path::new("data/TRANSACTION_TAKEHOME.csv")),
            "TRANSACTION_TAKEHOME"
        );
    }

    #[test]
    fn test_candidate_extensions() {
        let loader = Loader::new();
        assert!(loader.is_candidate(Path::new("a.CSV")));
        assert!(loader.is_candidate(Path::new("a.tsv")));
        assert!(!loader.is_candidate(Path::new("a.json")));
        assert!(!loader.is_candidate(Path::new("requirements.txt")));
        assert!(!loader.is_candidate(Path::new("README")));
    }

    #[test]
    fn test_extra_extension_is_opt_in() {
        let loader = Loader::with_config(LoaderConfig::default().with_extension(".TXT"));
        assert!(loader.is_candidate(Path::new("data.txt")));
        assert!(loader.is_candidate(Path::new("data.csv")));
    }

    #[test]
    fn test_load_file_rejects_other_extensions() {
        let err = Loader::new().load_file("LICENSE.txt").unwrap_err();
        assert!(matches!(err, AssayError::UnsupportedFormat(_)));
    }
}
