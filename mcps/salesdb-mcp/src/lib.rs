//! SalesDB MCP Library
//!
//! Table-scoped secure SQL tools for the property sales agent. The guard
//! validates every query against a read/write access policy before the
//! executor touches the database; the server exposes both behind MCP
//! tools, together with a timestamp helper and a project info web search.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use salesdb_mcp::{SalesDbConfig, SalesDbMcpServer};
//!
//! let config = SalesDbConfig::with_database("sales.db".into());
//! let server = SalesDbMcpServer::with_config(config)?;
//! // Serve via stdio, or call the guard/executor directly
//! ```

pub mod config;
pub mod executor;
pub mod guard;
pub mod handlers;
pub mod params;
pub mod schema;
pub mod search;
pub mod server;
#[cfg(test)]
mod tests;
pub mod types;

// Re-export main entry points
pub use config::SalesDbConfig;
pub use server::SalesDbMcpServer;

// Re-export parameter types for direct API usage
pub use params::*;
