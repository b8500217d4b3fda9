//! Configuration for the SalesDB MCP Server
//!
//! Loaded from TOML with serde defaults for every field. Lookup order:
//! 1. `SALESDB_CONFIG_PATH` environment variable
//! 2. `~/.salesdb/config.toml`
//! 3. Defaults
//!
//! `SEARXNG_URL` overrides the search backend URL regardless of source.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesDbConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// SQL access policy (whitelists and keyword blacklist)
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Project info search settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// SQLite busy timeout in seconds
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Insert demo project rows into an empty database at startup
    #[serde(default)]
    pub seed_demo_data: bool,
}

/// SQL access policy
///
/// Immutable after load; the guard compiles these into regexes once at
/// construction. Absence from a whitelist is an implicit deny.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Keywords rejected anywhere in a query, on both paths
    #[serde(default = "default_forbidden_keywords")]
    pub forbidden_keywords: Vec<String>,

    /// Tables readable via SELECT/WITH
    #[serde(default = "default_read_tables")]
    pub read_allowed_tables: Vec<String>,

    /// Tables writable via INSERT/UPDATE
    #[serde(default = "default_write_tables")]
    pub write_allowed_tables: Vec<String>,
}

/// Project info search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SearXNG instance URL
    #[serde(default = "default_searxng_url")]
    pub searxng_url: String,

    /// Engines to use (comma-separated, empty = instance defaults)
    #[serde(default)]
    pub engines: String,

    /// Maximum number of search results to return
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("salesdb.db")
}

fn default_busy_timeout() -> u64 {
    30
}

fn default_forbidden_keywords() -> Vec<String> {
    [
        "DELETE", "DROP", "TRUNCATE", "ALTER", "EXEC", "EXECUTE", "GRANT", "REVOKE", "CREATE",
        "REPLACE", "ATTACH", "DETACH", "PRAGMA",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_read_tables() -> Vec<String> {
    vec![
        "leads".to_string(),
        "bookings".to_string(),
        "projects".to_string(),
    ]
}

fn default_write_tables() -> Vec<String> {
    vec!["bookings".to_string(), "leads".to_string()]
}

fn default_searxng_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_results() -> usize {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_secs: default_busy_timeout(),
            seed_demo_data: false,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            forbidden_keywords: default_forbidden_keywords(),
            read_allowed_tables: default_read_tables(),
            write_allowed_tables: default_write_tables(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            searxng_url: default_searxng_url(),
            engines: String::new(),
            max_results: default_max_results(),
        }
    }
}

impl SalesDbConfig {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {:?}", path))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config from {:?}", path))?
            }
            _ => {
                tracing::info!("No config file found, using defaults");
                Self::default()
            }
        };

        // Search URL from environment (highest priority)
        if let Ok(url) = std::env::var("SEARXNG_URL") {
            config.search.searxng_url = url;
        }

        Ok(config)
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SALESDB_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        dirs::home_dir().map(|home| home.join(".salesdb").join("config.toml"))
    }

    /// Create a config pointing to a specific database, defaults elsewhere
    pub fn with_database(path: PathBuf) -> Self {
        Self {
            database: DatabaseConfig {
                path,
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_lists() {
        let policy = PolicyConfig::default();
        assert!(policy.forbidden_keywords.iter().any(|k| k == "DELETE"));
        assert!(policy.forbidden_keywords.iter().any(|k| k == "PRAGMA"));
        assert_eq!(policy.read_allowed_tables.len(), 3);
        assert_eq!(policy.write_allowed_tables.len(), 2);
        assert!(!policy.write_allowed_tables.contains(&"projects".to_string()));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SalesDbConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/test.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.database.busy_timeout_secs, 30);
        assert_eq!(config.policy.read_allowed_tables.len(), 3);
        assert_eq!(config.search.max_results, 5);
    }
}
