//! Tool handlers
//!
//! Each handler runs the query through the guard, then the executor, and
//! shapes the outcome into a reply. Policy violations come back as Error
//! replies inside a successful tool result: the calling agent treats tool
//! errors as hard stops, while an error string lets it revise the query
//! and continue the conversation.

use mcp_common::{json_success, text_success, CallToolResult, McpError};

use crate::executor::QueryExecutor;
use crate::guard::SqlGuard;
use crate::params::*;
use crate::search::{SearchBackend, SearchResults};
use crate::types::{ReadReply, SearchReply, WriteReply};

pub async fn run_secure_read_query(
    guard: &SqlGuard,
    executor: &QueryExecutor,
    params: ReadQueryParams,
) -> Result<CallToolResult, McpError> {
    tracing::debug!(query = %params.query, "read query received");

    let reply = match guard.validate_read(&params.query) {
        Ok(validated) => executor.execute_read(&params.query, &validated).await,
        Err(denied) => {
            tracing::info!(query = %params.query, %denied, "read query rejected");
            ReadReply::error(denied.to_string())
        }
    };

    json_success(&reply)
}

pub async fn run_secure_write_query(
    guard: &SqlGuard,
    executor: &QueryExecutor,
    params: WriteQueryParams,
) -> Result<CallToolResult, McpError> {
    tracing::debug!(query = %params.query, "write query received");

    let reply = match guard.validate_write(&params.query) {
        Ok(validated) => executor.execute_write(&params.query, &validated).await,
        Err(denied) => {
            tracing::info!(query = %params.query, %denied, "write query rejected");
            WriteReply::error(denied.to_string())
        }
    };

    json_success(&reply)
}

/// Current local time as 'YYYY-MM-DD HH:MM:SS'
///
/// The write tool takes literal SQL, so this string slots directly into
/// INSERT/UPDATE values.
pub fn get_current_time() -> CallToolResult {
    text_success(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

pub async fn search_project_info(
    backend: &dyn SearchBackend,
    limit: usize,
    params: ProjectSearchParams,
) -> Result<CallToolResult, McpError> {
    let query = build_search_query(&params);
    tracing::info!(%query, "project info search");

    let reply = match backend.search(&query, limit).await {
        Ok(found) if found.results.is_empty() => {
            SearchReply::warning("No search results found for the given project")
        }
        Ok(found) => SearchReply::success(
            format!("Found information about '{}'", params.project_name),
            format_search_results(&found),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "project info search failed");
            SearchReply::error(format!(
                "{}. Try a different project name, description or metadata.",
                e
            ))
        }
    };

    json_success(&reply)
}

fn build_search_query(params: &ProjectSearchParams) -> String {
    let mut parts = vec![params.project_name.trim(), params.location.trim()];

    for extra in [
        params.project_description.trim(),
        params.project_metadata.trim(),
    ] {
        if !extra.is_empty() {
            parts.push(extra);
        }
    }

    parts.join(" ")
}

fn format_search_results(results: &SearchResults) -> String {
    results
        .results
        .iter()
        .map(|hit| format!("Title: {}\nSnippet: {}", hit.title, hit.description))
        .collect::<Vec<_>>()
        .join("\n---\n")
}
