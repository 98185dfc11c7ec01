//! Combined profile of every loaded table.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use super::integrity::{key_integrity, KeyIntegrity, KeyRelation};
use super::quality::{data_types, duplicate_count, missing_values};
use super::summary::{describe, info as table_info, NumericSummary, TableInfo};
use crate::error::AssayError;
use crate::input::NamedTables;
use crate::schema::ColumnType;

/// Result of checking one declared relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrityStatus {
    Checked(KeyIntegrity),
    /// One or both tables never loaded; the check could not run.
    MissingDatasets { missing: Vec<String> },
    /// The tables loaded but the relation does not fit them.
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityCheck {
    pub relation: KeyRelation,
    #[serde(flatten)]
    pub status: IntegrityStatus,
}

impl IntegrityCheck {
    /// Unmatched key count when the check ran.
    pub fn unmatched(&self) -> Option<usize> {
        match &self.status {
            IntegrityStatus::Checked(result) => Some(result.unmatched),
            _ => None,
        }
    }
}

/// Everything the profiler knows about a set of tables.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub info: IndexMap<String, TableInfo>,
    pub missing_values: IndexMap<String, IndexMap<String, usize>>,
    pub duplicate_counts: IndexMap<String, usize>,
    pub data_types: IndexMap<String, IndexMap<String, ColumnType>>,
    pub describe: IndexMap<String, IndexMap<String, NumericSummary>>,
    pub key_integrity: Vec<IntegrityCheck>,
}

impl ProfileReport {
    /// Profile `tables` and check each relation.
    ///
    /// Never fails: a relation whose tables are absent is reported as
    /// [`IntegrityStatus::MissingDatasets`] and the rest of the report is
    /// still produced.
    pub fn build(tables: &NamedTables, relations: &[KeyRelation]) -> Self {
        info!(tables = tables.len(), "checking for missing values");
        let missing_values = missing_values(tables);
        info!("checking for duplicates");
        let duplicate_counts = duplicate_count(tables);
        info!("checking for data types");
        let data_types = data_types(tables);

        let key_integrity = relations
            .iter()
            .map(|relation| IntegrityCheck {
                relation: relation.clone(),
                status: check_relation(tables, relation),
            })
            .collect();

        Self {
            info: table_info(tables),
            missing_values,
            duplicate_counts,
            data_types,
            describe: describe(tables),
            key_integrity,
        }
    }

    /// True when at least one relation could not be checked.
    pub fn is_degraded(&self) -> bool {
        self.key_integrity
            .iter()
            .any(|check| !matches!(check.status, IntegrityStatus::Checked(_)))
    }
}

fn check_relation(tables: &NamedTables, relation: &KeyRelation) -> IntegrityStatus {
    match key_integrity(tables, relation) {
        Ok(result) => IntegrityStatus::Checked(result),
        Err(AssayError::MissingTable(_)) => {
            let missing = relation.missing_tables(tables);
            warn!(relation = %relation.label, ?missing, "Missing required datasets");
            IntegrityStatus::MissingDatasets { missing }
        }
        Err(e) => {
            warn!(relation = %relation.label, error = %e, "Key integrity check skipped");
            IntegrityStatus::Invalid {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Table;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::from_raw(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_degraded_when_parent_missing() {
        let tables = NamedTables::new()
            .with_table("transactions", make_table(vec!["USER_ID"], vec![vec!["u1"]]));
        let relations = vec![KeyRelation::new(
            "missing_user_ids_in_transactions",
            "transactions",
            "USER_ID",
            "users",
            "ID",
        )];

        let report = ProfileReport::build(&tables, &relations);

        assert!(report.is_degraded());
        assert_eq!(
            report.key_integrity[0].status,
            IntegrityStatus::MissingDatasets {
                missing: vec!["users".to_string()]
            }
        );
        assert_eq!(report.duplicate_counts["transactions"], 0);
    }

    #[test]
    fn test_serializes_status_inline() {
        let tables = NamedTables::new()
            .with_table("c", make_table(vec!["id"], vec![vec!["1"], vec!["9"]]))
            .with_table("p", make_table(vec!["id"], vec![vec!["1"]]));
        let relations = vec![KeyRelation::new("orphans", "c", "id", "p", "id")];

        let report = ProfileReport::build(&tables, &relations);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["key_integrity"][0]["status"], "checked");
        assert_eq!(json["key_integrity"][0]["unmatched"], 1);
        assert_eq!(report.key_integrity[0].unmatched(), Some(1));
    }
}
