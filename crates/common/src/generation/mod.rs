//! Text generation capability abstraction
//!
//! Provides a unified interface for prompt completion:
//! - Together AI completions (Mistral-7B-Instruct by default)
//! - Mock generator for offline development

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for text generation
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Complete a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Together AI completions client
pub struct TogetherGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl TogetherGenerator {
    /// Create a new Together client
    pub fn new(api_key: String, config: &GenerationConfig) -> Result<Self> {
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
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerationCapability for TogetherGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::DraftFailure {
                message: format!("LLM API request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::DraftFailure {
                message: format!("LLM API error {}: {}", status, body),
            });
        }

        let body = response.text().await.map_err(|e| AppError::DraftFailure {
            message: format!("Failed to read LLM response: {}", e),
        })?;

        parse_completion(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn parse_completion(body: &str) -> Result<String> {
    let parsed: CompletionResponse = serde_json::from_str(body).map_err(|e| AppError::DraftFailure {
        message: format!("Failed to parse LLM response: {}", e),
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| AppError::DraftFailure {
            message: "Empty response from LLM".to_string(),
        })
}

/// Mock generator for offline runs
pub struct MockGenerator;

#[async_trait]
impl GenerationCapability for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let query = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Query: "))
            .unwrap_or("your question");

        Ok(format!(
            "Here is a draft answer about {}, based on the collected research. \
            [Mock response - LLM API key not configured]",
            query
        ))
    }

    fn model_name(&self) -> &str {
        "mock-generation"
    }
}

/// Create a generation capability based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn GenerationCapability>> {
    match config.provider.as_str() {
        "together" => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| AppError::Configuration {
                    message: "Together API key required (set TOGETHER_API_KEY)".to_string(),
                })?;
            Ok(Arc::new(TogetherGenerator::new(key, config)?))
        }
        "mock" => Ok(Arc::new(MockGenerator)),
        other => Err(AppError::Configuration {
            message: format!("Unknown generation provider: {}", other),
        }),
    }
}
