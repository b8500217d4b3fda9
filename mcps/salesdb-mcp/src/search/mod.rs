//! Search backend abstraction for project info lookup
//!
//! The sales agent occasionally needs web context a listing database does
//! not carry (nearby amenities, reviews, connectivity). Backends implement
//! this trait; SearXNG is the provided implementation.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod searxng;

/// A single search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The title of the result
    pub title: String,
    /// The URL of the result
    pub url: String,
    /// A description or snippet of the result
    pub description: String,
    /// The source/engine of the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A collection of search hits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// The query that was executed
    pub query: String,
    /// The search hits
    pub results: Vec<SearchHit>,
    /// The backend that was used
    pub backend: String,
}

/// Trait for search backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Perform a web search
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults>;

    /// Check if this backend is configured and available
    fn is_available(&self) -> bool;
}
