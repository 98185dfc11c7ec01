//! Staging named tables into an in-memory SQLite database.

use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::definitions::{DatasetNames, QueryDefinition};
use super::dedup::dedup_receipts;
use super::result::QueryResult;
use crate::error::Result;
use crate::input::{NamedTables, Table};
use crate::schema::Value;

/// Relation name for a table: lowercase, non-alphanumerics as `_`.
pub fn relation_name(table_name: &str) -> String {
    table_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Relation holding the receipt-deduplicated transactions.
pub fn dedup_relation_name(transactions: &str) -> String {
    format!("{}_dedup", relation_name(transactions))
}

/// Double-quote an SQL identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// What happened to one relation during staging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Staged { relation: String, rows: usize },
    Failed { relation: String, error: String },
}

impl StageOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, StageOutcome::Staged { .. })
    }
}

/// Owns one in-memory SQLite connection for the length of a run.
///
/// The connection is never shared; [`QueryRunner::close`] releases it, and
/// dropping the runner releases it as well.
pub struct QueryRunner {
    conn: Connection,
}

impl QueryRunner {
    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Stage every table under its relation name, replacing prior relations.
    ///
    /// When the transactions table is present its receipt-deduplicated form
    /// is staged too. A table that cannot be staged is recorded and skipped;
    /// queries reading it then fail on their own.
    pub fn stage(&mut self, tables: &NamedTables, names: &DatasetNames) -> Vec<StageOutcome> {
        let mut outcomes = Vec::with_capacity(tables.len() + 1);

        for (name, table) in tables.iter() {
            let relation = relation_name(name);
            outcomes.push(self.stage_logged(name, relation, table));
        }

        if let Some(transactions) = tables.get(&names.transactions) {
            match dedup_receipts(transactions) {
                Ok(deduped) => {
                    let relation = dedup_relation_name(&names.transactions);
                    outcomes.push(self.stage_logged(&names.transactions, relation, &deduped));
                }
                Err(e) => warn!(error = %e, "Receipt deduplication skipped"),
            }
        }

        outcomes
    }

    fn stage_logged(&mut self, table_name: &str, relation: String, table: &Table) -> StageOutcome {
        match self.stage_table(&relation, table) {
            Ok(()) => {
                info!(table = %table_name, relation = %relation, rows = table.row_count(), "Loaded into SQL table");
                StageOutcome::Staged {
                    relation,
                    rows: table.row_count(),
                }
            }
            Err(e) => {
                warn!(table = %table_name, relation = %relation, error = %e, "Could not stage table");
                StageOutcome::Failed {
                    relation,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Create (or replace) one relation and fill it in a single transaction.
    pub fn stage_table(&mut self, relation: &str, table: &Table) -> Result<()> {
        let quoted = quote_ident(relation);
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|col| format!("{} {}", quote_ident(&col.name), col.column_type.sql_affinity()))
            .collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {quoted};\nCREATE TABLE {quoted} ({});",
            column_defs.join(", ")
        ))?;

        if !table.columns.is_empty() {
            let placeholders = vec!["?"; table.column_count()].join(", ");
            let mut insert = tx.prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))?;
            for row in &table.rows {
                insert.execute(params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Run one query. Staged data is never modified.
    pub fn run(&self, query: &QueryDefinition) -> Result<QueryResult> {
        debug!(query = %query.name, sql = %query.sql, "Running query");

        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let bound: Vec<(&str, &dyn rusqlite::ToSql)> = query
            .params
            .iter()
            .map(|p| (p.name.as_str(), &p.value as &dyn rusqlite::ToSql))
            .collect();

        let mut rows = stmt.query(bound.as_slice())?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for idx in 0..width {
                record.push(Value::from_sql_ref(row.get_ref(idx)?));
            }
            values.push(record);
        }

        debug!(query = %query.name, rows = values.len(), "Query finished");
        Ok(QueryResult {
            name: query.name.clone(),
            description: query.description.clone(),
            columns,
            rows: values,
        })
    }

    /// Run each query independently; a failure aborts only that query.
    pub fn run_all(&self, queries: &[QueryDefinition]) -> Vec<(String, Result<QueryResult>)> {
        queries
            .iter()
            .map(|query| {
                let result = self.run(query);
                if let Err(e) = &result {
                    warn!(query = %query.name, error = %e, "Query failed");
                }
                (query.name.clone(), result)
            })
            .collect()
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, ColumnType};

    #[test]
    fn test_relation_name() {
        assert_eq!(relation_name("TRANSACTION_TAKEHOME"), "transaction_takehome");
        assert_eq!(relation_name("My Data-2024"), "my_data_2024");
        assert_eq!(dedup_relation_name("T"), "t_dedup");
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_stage_skips_table_that_cannot_be_created() {
        let good = Table::from_raw(vec!["a".to_string()], vec![vec!["1".to_string()]]);
        // SQLite column names are case-insensitive
        let clashing = Table::new(
            vec![
                ColumnSchema::new("id", 0, ColumnType::Integer),
                ColumnSchema::new("ID", 1, ColumnType::Integer),
            ],
            vec![vec![Value::Integer(1), Value::Integer(2)]],
        );
        let tables = NamedTables::new()
            .with_table("notes", clashing)
            .with_table("good", good);

        let mut runner = QueryRunner::open_in_memory().unwrap();
        let outcomes = runner.stage(&tables, &DatasetNames::default());

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(&outcomes[0], StageOutcome::Failed { relation, .. } if relation == "notes"));
        assert_eq!(
            outcomes[1],
            StageOutcome::Staged {
                relation: "good".to_string(),
                rows: 1
            }
        );

        let query = QueryDefinition {
            name: "count".to_string(),
            description: String::new(),
            sql: r#"SELECT COUNT(*) FROM "good""#.to_string(),
            params: Vec::new(),
        };
        assert_eq!(runner.run(&query).unwrap().rows[0][0], Value::Integer(1));
    }

    #[test]
    fn test_stage_replaces_existing_relation() {
        let first = Table::from_raw(vec!["a".to_string()], vec![vec!["1".to_string()]]);
        let second = Table::from_raw(
            vec!["b".to_string()],
            vec![vec!["x".to_string()], vec!["y".to_string()]],
        );

        let mut runner = QueryRunner::open_in_memory().unwrap();
        runner.stage_table("t", &first).unwrap();
        runner.stage_table("t", &second).unwrap();

        let query = QueryDefinition {
            name: "count".to_string(),
            description: String::new(),
            sql: r#"SELECT COUNT(*) AS n, MAX("b") AS last FROM "t""#.to_string(),
            params: Vec::new(),
        };
        let result = runner.run(&query).unwrap();
        assert_eq!(result.rows[0][0], Value::Integer(2));
        assert_eq!(result.rows[0][1], Value::Text("y".to_string()));
        runner.close().unwrap();
    }
}
