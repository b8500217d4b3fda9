//! Query executor and result shaper
//!
//! Runs queries the guard already approved and shapes the outcome into a
//! reply. No policy enforcement happens here: the guard decides whether a
//! query may run, this module decides how to run it and how to interpret
//! what the database returned. Every database error is caught at this
//! boundary; callers always receive a reply, never an error.

use std::sync::Arc;

use anyhow::Result;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::types::{Operation, ReadReply, Row, ValidatedQuery, WriteReply};

struct WriteStats {
    affected: usize,
    last_insert_id: i64,
}

/// Executes validated queries against the shared connection
#[derive(Clone)]
pub struct QueryExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl QueryExecutor {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Run a read query and shape the rows
    ///
    /// Zero rows is a success, not an error.
    pub async fn execute_read(&self, query: &str, validated: &ValidatedQuery) -> ReadReply {
        match self.fetch_rows(query).await {
            Ok(rows) => ReadReply::success(
                format!(
                    "Retrieved {} row(s) from tables: {}",
                    rows.len(),
                    validated.table_list()
                ),
                rows,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "read query failed after validation");
                ReadReply::error(format!(
                    "Unexpected error during query execution (try with a different query): {}",
                    e
                ))
            }
        }
    }

    /// Run a write query and shape the outcome
    ///
    /// INSERT reports the new row id, UPDATE the affected-row count. Zero
    /// rows affected is reported as a warning with payload 0.
    pub async fn execute_write(&self, query: &str, validated: &ValidatedQuery) -> WriteReply {
        let stats = match self.run_write(query).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "write query failed after validation");
                return WriteReply::error(format!(
                    "Unexpected error during query execution (try with a different query): {}",
                    e
                ));
            }
        };

        if stats.affected == 0 {
            return WriteReply::warning("Query executed but no rows were affected");
        }

        let table = validated.primary_table();
        match validated.operation {
            Operation::Insert => WriteReply::success(
                format!("New {} record created with ID: {}", table, stats.last_insert_id),
                stats.last_insert_id,
            ),
            Operation::Update => WriteReply::success(
                format!("Updated {} {} record(s)", stats.affected, table),
                stats.affected as i64,
            ),
            _ => WriteReply::success(
                format!(
                    "Operation completed on {}, affected row count: {}",
                    table, stats.affected
                ),
                stats.affected as i64,
            ),
        }
    }

    async fn fetch_rows(&self, query: &str) -> Result<Vec<Row>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(query)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let rows = stmt
            .query_map([], |row| {
                let mut map = Row::new();
                for (i, name) in columns.iter().enumerate() {
                    let value: rusqlite::types::Value = row.get(i)?;
                    map.insert(name.clone(), sql_value_to_json(value));
                }
                Ok(map)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    async fn run_write(&self, query: &str) -> Result<WriteStats> {
        let mut conn = self.conn.lock().await;

        // Transaction drop rolls back, so no failure path can leave the
        // connection mid-write.
        let tx = conn.transaction()?;
        let affected = tx.execute(query, [])?;
        let last_insert_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(WriteStats {
            affected,
            last_insert_id,
        })
    }
}

fn sql_value_to_json(value: rusqlite::types::Value) -> serde_json::Value {
    match value {
        rusqlite::types::Value::Null => serde_json::Value::Null,
        rusqlite::types::Value::Integer(i) => serde_json::json!(i),
        rusqlite::types::Value::Real(f) => serde_json::json!(f),
        rusqlite::types::Value::Text(s) => serde_json::Value::String(s),
        rusqlite::types::Value::Blob(b) => {
            serde_json::Value::String(format!("<blob {} bytes>", b.len()))
        }
    }
}
