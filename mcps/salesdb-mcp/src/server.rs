//! MCP Server implementation for the secure sales database tools
//!
//! This module defines the main MCP server that exposes the SQL tools to
//! the agent runtime. Handler implementations are in the handlers module;
//! the guard and executor are constructed here and injected by reference.

use std::sync::Arc;

use mcp_common::{CallToolResult, McpError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::config::SalesDbConfig;
use crate::executor::QueryExecutor;
use crate::guard::SqlGuard;
use crate::handlers;
use crate::params::*;
use crate::schema;
use crate::search::{searxng::SearXNGBackend, SearchBackend};

/// The SalesDB MCP Server
#[derive(Clone)]
pub struct SalesDbMcpServer {
    guard: SqlGuard,
    executor: QueryExecutor,
    search: Arc<dyn SearchBackend>,
    config: SalesDbConfig,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SalesDbMcpServer {
    /// Create a new server, loading config from standard locations
    pub fn new() -> Self {
        let config = SalesDbConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}. Using default.", e);
            SalesDbConfig::default()
        });

        Self::with_config(config).expect("Failed to create SalesDbMcpServer")
    }

    /// Create a new server with explicit config
    pub fn with_config(config: SalesDbConfig) -> anyhow::Result<Self> {
        let conn = match Connection::open(&config.database.path) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(
                    "Failed to open database at {:?}: {}. Falling back to in-memory database.",
                    config.database.path,
                    e
                );
                Connection::open_in_memory()?
            }
        };

        let _ = conn.busy_timeout(std::time::Duration::from_secs(
            config.database.busy_timeout_secs,
        ));

        schema::ensure_tables(&conn)?;
        if config.database.seed_demo_data {
            let seeded = schema::seed_demo_projects(&conn)?;
            if seeded > 0 {
                tracing::info!("Seeded {} demo project(s)", seeded);
            }
        }

        let guard = SqlGuard::new(&config.policy)?;
        let executor = QueryExecutor::new(Arc::new(Mutex::new(conn)));
        let search: Arc<dyn SearchBackend> = Arc::new(SearXNGBackend::new(config.search.clone()));

        if !search.is_available() {
            tracing::warn!("Search backend '{}' is not available", search.name());
        }

        Ok(Self {
            guard,
            executor,
            search,
            config,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        description = "Execute a secure READ-ONLY SQL query (SELECT/WITH) on allowed tables: leads, bookings, projects. The history table is not accessible. Returns a status message and the result rows."
    )]
    async fn run_secure_read_query(
        &self,
        Parameters(params): Parameters<ReadQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_secure_read_query(&self.guard, &self.executor, params).await
    }

    #[tool(
        description = "Execute a secure WRITE SQL query (INSERT/UPDATE) on the bookings and leads tables only. Use literal values in the query, not placeholders. Returns a status message and the new row ID (INSERT) or affected row count (UPDATE)."
    )]
    async fn run_secure_write_query(
        &self,
        Parameters(params): Parameters<WriteQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_secure_write_query(&self.guard, &self.executor, params).await
    }

    #[tool(
        description = "Get the current timestamp as 'YYYY-MM-DD HH:MM:SS' for use as a string literal in INSERT or UPDATE queries."
    )]
    async fn get_current_time(&self) -> Result<CallToolResult, McpError> {
        Ok(handlers::get_current_time())
    }

    #[tool(
        description = "Search the web for additional information about a property project (amenities, connectivity, reviews) that is not in the database."
    )]
    async fn search_project_info(
        &self,
        Parameters(params): Parameters<ProjectSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::search_project_info(self.search.as_ref(), self.config.search.max_results, params)
            .await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for SalesDbMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Secure sales database MCP server. Read access (SELECT/WITH) is limited \
                 to the leads, bookings and projects tables; write access (INSERT/UPDATE) \
                 to bookings and leads only. The projects table is read-only and the \
                 history table is never accessible. Destructive SQL is rejected. \
                 Use get_current_time for timestamp literals and search_project_info \
                 for web context about a project."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

impl Default for SalesDbMcpServer {
    fn default() -> Self {
        Self::new()
    }
}
