//! Type definitions for the sales database tools
//!
//! The guard produces `Result<ValidatedQuery, GuardError>`; the executor
//! shapes outcomes into the tagged reply enums consumed by the agent.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// A result row: column name to JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Query Classification
// ============================================================================

/// The leading SQL verb of a normalized query
///
/// `Other` carries the raw first token (possibly empty) for error messages.
/// Classification makes no judgment about validity; the guard does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Select,
    With,
    Insert,
    Update,
    Other(String),
}

impl Operation {
    /// Classify the first whitespace-delimited token of a normalized query
    pub fn classify(normalized: &str) -> Self {
        let token = normalized.split_whitespace().next().unwrap_or("");
        match token {
            "SELECT" => Self::Select,
            "WITH" => Self::With,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            other => Self::Other(other.to_string()),
        }
    }

    /// The token this operation was classified from
    pub fn token(&self) -> &str {
        match self {
            Self::Select => "SELECT",
            Self::With => "WITH",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Other(token) => token,
        }
    }
}

/// A query that passed validation, with the facts the executor needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub operation: Operation,
    /// Lowercased table names, sorted for deterministic messages
    pub tables: BTreeSet<String>,
}

impl ValidatedQuery {
    /// Comma-separated table list for status messages
    pub fn table_list(&self) -> String {
        self.tables.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// First extracted table, used in write status messages
    pub fn primary_table(&self) -> &str {
        self.tables
            .iter()
            .next()
            .map(String::as_str)
            .unwrap_or("table")
    }
}

// ============================================================================
// Policy Violations
// ============================================================================

/// Why a query was rejected before execution
///
/// Display texts are the user-facing messages handed back to the agent;
/// handlers prepend the `Error:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Empty query provided")]
    EmptyQuery,

    #[error("Forbidden operation '{0}' detected. Only SELECT and WITH operations are allowed for reading.")]
    ReadKeywordDenied(String),

    #[error("Forbidden operation '{0}' detected. Only INSERT and UPDATE operations are allowed for writing.")]
    WriteKeywordDenied(String),

    #[error("Operation '{0}' not allowed for read queries. Only SELECT and WITH are permitted.")]
    ReadOperationDenied(String),

    #[error("Operation '{0}' not allowed for write queries. Only INSERT and UPDATE are permitted.")]
    WriteOperationDenied(String),

    #[error("No valid table found in query. Please specify a table to query.")]
    NoReadTable,

    #[error("No valid table found in query. Please specify a table to write to.")]
    NoWriteTable,

    #[error("Unauthorized table access detected: {tables}. Allowed tables for reading: {allowed}. Note: 'history' table is not accessible.")]
    UnauthorizedReadTables { tables: String, allowed: String },

    #[error("Unauthorized table write access detected: {tables}. Only 'bookings' and 'leads' tables are allowed for write operations.")]
    UnauthorizedWriteTables { tables: String },

    #[error("Access to 'history' table is forbidden. Allowed tables: leads, bookings, projects.")]
    HistoryRead,

    #[error("Write access to 'history' table is absolutely forbidden.")]
    HistoryWrite,

    #[error("Write access to 'projects' table is forbidden. Only 'bookings' and 'leads' tables can be modified.")]
    ProjectsReadOnly,
}

// ============================================================================
// Tool Replies
// ============================================================================

/// Outcome of a read tool call
///
/// Message begins with `Success:` or `Error:`; rows are empty on error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReadReply {
    Success { message: String, rows: Vec<Row> },
    Error { message: String, rows: Vec<Row> },
}

impl ReadReply {
    pub fn success(message: impl Into<String>, rows: Vec<Row>) -> Self {
        Self::Success {
            message: format!("Success: {}", message.into()),
            rows,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: format!("Error: {}", message.into()),
            rows: Vec::new(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Error { message, .. } => message,
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Success { rows, .. } | Self::Error { rows, .. } => rows,
        }
    }
}

/// Outcome of a write tool call
///
/// Result is the new-row id for INSERT, the affected-row count for UPDATE,
/// and 0 for warnings and errors.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WriteReply {
    Success { message: String, result: i64 },
    Warning { message: String, result: i64 },
    Error { message: String, result: i64 },
}

impl WriteReply {
    pub fn success(message: impl Into<String>, result: i64) -> Self {
        Self::Success {
            message: format!("Success: {}", message.into()),
            result,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: format!("Warning: {}", message.into()),
            result: 0,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: format!("Error: {}", message.into()),
            result: 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. }
            | Self::Warning { message, .. }
            | Self::Error { message, .. } => message,
        }
    }

    pub fn result(&self) -> i64 {
        match self {
            Self::Success { result, .. }
            | Self::Warning { result, .. }
            | Self::Error { result, .. } => *result,
        }
    }
}

/// Outcome of a project info search
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchReply {
    Success { message: String, results: String },
    Warning { message: String, results: String },
    Error { message: String, results: String },
}

impl SearchReply {
    pub fn success(message: impl Into<String>, results: String) -> Self {
        Self::Success {
            message: format!("Success: {}", message.into()),
            results,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: format!("Warning: {}", message.into()),
            results: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: format!("Error: {}", message.into()),
            results: String::new(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. }
            | Self::Warning { message, .. }
            | Self::Error { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_operations() {
        assert_eq!(Operation::classify("SELECT * FROM X"), Operation::Select);
        assert_eq!(Operation::classify("WITH A AS (1)"), Operation::With);
        assert_eq!(Operation::classify("INSERT INTO X"), Operation::Insert);
        assert_eq!(Operation::classify("UPDATE X SET Y"), Operation::Update);
    }

    #[test]
    fn test_classify_unknown_and_empty() {
        assert_eq!(
            Operation::classify("DROP TABLE X"),
            Operation::Other("DROP".to_string())
        );
        assert_eq!(Operation::classify(""), Operation::Other(String::new()));
    }

    #[test]
    fn test_reply_message_prefixes() {
        let read = ReadReply::success("done", Vec::new());
        assert!(read.message().starts_with("Success:"));

        let read = ReadReply::error("nope");
        assert!(read.message().starts_with("Error:"));
        assert!(read.rows().is_empty());

        let write = WriteReply::warning("nothing happened");
        assert!(write.message().starts_with("Warning:"));
        assert_eq!(write.result(), 0);
    }

    #[test]
    fn test_reply_serializes_with_status_tag() {
        let reply = ReadReply::success("ok", Vec::new());
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "Success: ok");

        let reply = WriteReply::error("denied");
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["result"], 0);
    }
}
