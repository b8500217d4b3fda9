//! SalesDB MCP Server
//!
//! Table-scoped secure SQL tools for the property sales agent.
//! Configure via `SALESDB_CONFIG_PATH` or `~/.salesdb/config.toml`.

use salesdb_mcp::SalesDbMcpServer;

mcp_common::serve_stdio!(SalesDbMcpServer, "salesdb_mcp");
