//! SearXNG backend
//!
//! Implements the SearchBackend trait using a self-hosted SearXNG instance.
//! See: https://docs.searxng.org/dev/search_api.html

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{SearchBackend, SearchHit, SearchResults};
use crate::config::SearchConfig;

/// SearXNG backend
pub struct SearXNGBackend {
    client: Client,
    config: SearchConfig,
}

impl SearXNGBackend {
    pub fn new(config: SearchConfig) -> Self {
        let client = Client::builder()
            .user_agent("salesdb-mcp/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }
}

// SearXNG API response types
#[derive(Debug, Deserialize)]
struct SearXNGResponse {
    results: Vec<SearXNGResult>,
}

#[derive(Debug, Deserialize)]
struct SearXNGResult {
    title: String,
    url: String,
    content: Option<String>,
    engine: Option<String>,
    img_src: Option<String>,
}

#[async_trait]
impl SearchBackend for SearXNGBackend {
    fn name(&self) -> &str {
        "searxng"
    }

    fn is_available(&self) -> bool {
        !self.config.searxng_url.is_empty()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        if !self.is_available() {
            return Err(anyhow!("SearXNG URL not configured"));
        }

        let url = format!("{}/search", self.config.searxng_url);

        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("pageno", "1".to_string()),
        ];

        if !self.config.engines.is_empty() {
            params.push(("engines", self.config.engines.clone()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("SearXNG error {}: {}", status, text));
        }

        let searxng_response: SearXNGResponse = response.json().await?;

        let results: Vec<SearchHit> = searxng_response
            .results
            .into_iter()
            // Filter out image-only results
            .filter(|r| r.img_src.as_ref().map_or(true, |s| s.is_empty()))
            .take(limit)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: r.content.unwrap_or_default(),
                source: r.engine,
            })
            .collect();

        Ok(SearchResults {
            query: query.to_string(),
            results,
            backend: self.name().to_string(),
        })
    }
}
