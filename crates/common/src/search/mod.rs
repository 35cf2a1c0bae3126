//! Search capability abstraction
//!
//! Provides a unified interface for evidence retrieval:
//! - Tavily web search
//! - Mock search for offline development

use crate::config::SearchConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One evidence item returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Extracted text
    pub content: String,

    /// Where the text came from
    pub url: String,
}

impl Evidence {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
        }
    }
}

/// Trait for evidence retrieval
#[async_trait]
pub trait SearchCapability: Send + Sync {
    /// Retrieve ordered evidence for a query
    async fn search(&self, query: &str) -> Result<Vec<Evidence>>;

    /// Provider name used in logs
    fn provider_name(&self) -> &str;
}

/// Tavily search client
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: usize,
    search_depth: String,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    content: String,
    url: String,
}

impl TavilySearch {
    /// Create a new Tavily client
    pub fn new(api_key: String, config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
        })
    }
}

#[async_trait]
impl SearchCapability for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        let url = format!("{}/search", self.base_url);

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            search_depth: &self.search_depth,
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SearchFailure {
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::SearchFailure {
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(AppError::SearchFailure {
                message: format!("API error {}: {}", status, body),
            });
        }

        parse_tavily_response(&body)
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}

fn parse_tavily_response(body: &str) -> Result<Vec<Evidence>> {
    let parsed: TavilyResponse = serde_json::from_str(body).map_err(|e| AppError::SearchFailure {
        message: format!("Failed to parse response: {}", e),
    })?;

    Ok(parsed
        .results
        .into_iter()
        .map(|r| Evidence {
            content: r.content,
            url: r.url,
        })
        .collect())
}

/// Mock search for offline runs
pub struct MockSearch;

#[async_trait]
impl SearchCapability for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        Ok(vec![
            Evidence::new(
                format!("Background material on {}.", query.trim()),
                "https://example.com/background",
            ),
            Evidence::new(
                format!("Recent discussion of {}.", query.trim()),
                "https://example.com/recent",
            ),
        ])
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Create a search capability based on configuration
pub fn create_search(config: &SearchConfig) -> Result<Arc<dyn SearchCapability>> {
    match config.provider.as_str() {
        "tavily" => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| AppError::Configuration {
                    message: "Tavily API key required (set TAVILY_API_KEY)".to_string(),
                })?;
            Ok(Arc::new(TavilySearch::new(key, config)?))
        }
        "mock" => Ok(Arc::new(MockSearch)),
        other => Err(AppError::Configuration {
            message: format!("Unknown search provider: {}", other),
        }),
    }
}
