//! SQL guard - security layer for LLM-issued queries
//!
//! Validates raw SQL strings against a table-scoped read/write policy
//! before anything reaches the database. The analysis is lexical, not a
//! SQL parser: comments are stripped, the leading verb is classified, and
//! table names are taken from FROM/JOIN/INTO/UPDATE adjacency. Aliases,
//! table names inside string literals, and dialect constructs without one
//! of those keywords are outside the contract; anything unrecognized
//! fails closed.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::PolicyConfig;
use crate::types::{GuardError, Operation, ValidatedQuery};

/// Stateless query validator with compiled policy patterns
#[derive(Clone)]
pub struct SqlGuard {
    line_comments: Regex,
    block_comments: Regex,
    table_patterns: Vec<Regex>,
    read_deny: Vec<(String, Regex)>,
    write_deny: Vec<(String, Regex)>,
    read_allowed: BTreeSet<String>,
    write_allowed: BTreeSet<String>,
}

impl SqlGuard {
    /// Compile the policy into a guard
    pub fn new(policy: &PolicyConfig) -> Result<Self> {
        let line_comments = Regex::new(r"(?m)--.*$").context("line comment pattern")?;
        let block_comments = Regex::new(r"(?s)/\*.*?\*/").context("block comment pattern")?;

        let table_patterns = [
            r"\bFROM\s+(\w+)",
            r"\bJOIN\s+(\w+)",
            r"\bINTO\s+(\w+)",
            r"\bUPDATE\s+(\w+)",
        ]
        .iter()
        .map(|p| Regex::new(p).context("table pattern"))
        .collect::<Result<Vec<_>>>()?;

        let read_deny = compile_keywords(&policy.forbidden_keywords)?;

        // Write path must never permit reads-disguised-as-writes, so the
        // read verbs join the blacklist there.
        let mut write_keywords = policy.forbidden_keywords.clone();
        write_keywords.push("SELECT".to_string());
        write_keywords.push("WITH".to_string());
        let write_deny = compile_keywords(&write_keywords)?;

        Ok(Self {
            line_comments,
            block_comments,
            table_patterns,
            read_deny,
            write_deny,
            read_allowed: to_lower_set(&policy.read_allowed_tables),
            write_allowed: to_lower_set(&policy.write_allowed_tables),
        })
    }

    /// Strip comments, collapse whitespace, uppercase
    ///
    /// Pure and total: always returns a string, possibly empty.
    pub fn normalize(&self, raw: &str) -> String {
        let stripped = self.line_comments.replace_all(raw, "");
        let stripped = self.block_comments.replace_all(&stripped, "");
        stripped
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

    /// Extract table names following FROM/JOIN/INTO/UPDATE
    ///
    /// Lowercased, deduplicated. Best-effort by design: CTE bodies surface
    /// their real tables (intended), and CTE aliases selected in the outer
    /// query surface too, where the whitelist rejects them.
    pub fn extract_tables(&self, normalized: &str) -> BTreeSet<String> {
        let mut tables = BTreeSet::new();
        for pattern in &self.table_patterns {
            for caps in pattern.captures_iter(normalized) {
                tables.insert(caps[1].to_lowercase());
            }
        }
        tables
    }

    /// Validate a query for the read path (SELECT/WITH)
    ///
    /// Checks run in order and short-circuit on the first failure.
    pub fn validate_read(&self, raw: &str) -> Result<ValidatedQuery, GuardError> {
        let normalized = self.normalize(raw);
        if normalized.is_empty() {
            return Err(GuardError::EmptyQuery);
        }

        for (keyword, pattern) in &self.read_deny {
            if pattern.is_match(&normalized) {
                return Err(GuardError::ReadKeywordDenied(keyword.clone()));
            }
        }

        let operation = Operation::classify(&normalized);
        if !matches!(operation, Operation::Select | Operation::With) {
            return Err(GuardError::ReadOperationDenied(operation.token().to_string()));
        }

        let tables = self.extract_tables(&normalized);
        if tables.is_empty() {
            return Err(GuardError::NoReadTable);
        }

        let unauthorized: Vec<&str> = tables
            .iter()
            .filter(|t| !self.read_allowed.contains(*t))
            .map(String::as_str)
            .collect();
        if !unauthorized.is_empty() {
            return Err(GuardError::UnauthorizedReadTables {
                tables: unauthorized.join(", "),
                allowed: join_set(&self.read_allowed),
            });
        }

        // Redundant with the whitelist when history is absent from it, but
        // the block must hold even if a config puts history on the list.
        if tables.contains("history") {
            return Err(GuardError::HistoryRead);
        }

        Ok(ValidatedQuery { operation, tables })
    }

    /// Validate a query for the write path (INSERT/UPDATE)
    pub fn validate_write(&self, raw: &str) -> Result<ValidatedQuery, GuardError> {
        let normalized = self.normalize(raw);
        if normalized.is_empty() {
            return Err(GuardError::EmptyQuery);
        }

        for (keyword, pattern) in &self.write_deny {
            if pattern.is_match(&normalized) {
                return Err(GuardError::WriteKeywordDenied(keyword.clone()));
            }
        }

        let operation = Operation::classify(&normalized);
        if !matches!(operation, Operation::Insert | Operation::Update) {
            return Err(GuardError::WriteOperationDenied(
                operation.token().to_string(),
            ));
        }

        let tables = self.extract_tables(&normalized);
        if tables.is_empty() {
            return Err(GuardError::NoWriteTable);
        }

        // Hard blocks, independent of whitelist contents
        if tables.contains("history") {
            return Err(GuardError::HistoryWrite);
        }
        if tables.contains("projects") {
            return Err(GuardError::ProjectsReadOnly);
        }

        let unauthorized: Vec<&str> = tables
            .iter()
            .filter(|t| !self.write_allowed.contains(*t))
            .map(String::as_str)
            .collect();
        if !unauthorized.is_empty() {
            return Err(GuardError::UnauthorizedWriteTables {
                tables: unauthorized.join(", "),
            });
        }

        Ok(ValidatedQuery { operation, tables })
    }
}

fn compile_keywords(keywords: &[String]) -> Result<Vec<(String, Regex)>> {
    keywords
        .iter()
        .map(|keyword| {
            let upper = keyword.to_uppercase();
            let pattern = format!(r"\b{}\b", regex::escape(&upper));
            let regex = Regex::new(&pattern)
                .with_context(|| format!("Invalid keyword pattern '{}'", keyword))?;
            Ok((upper, regex))
        })
        .collect()
}

fn to_lower_set(tables: &[String]) -> BTreeSet<String> {
    tables.iter().map(|t| t.to_lowercase()).collect()
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}
