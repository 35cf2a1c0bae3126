//! Configuration management for the research pipeline
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with RESEARCH__)
//! - Provider key variables (TAVILY_API_KEY, TOGETHER_API_KEY)
//! - Configuration files (config/default.toml, config/{env}.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Search provider configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Text generation provider configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Pipeline execution configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Result recorder configuration
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Search provider: tavily, mock
    #[serde(default = "default_search_provider")]
    pub provider: String,

    /// API key for the search service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Maximum number of evidence items to request
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Search depth: basic, advanced
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Generation provider: together, mock
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Upper bound for a single capability call in seconds (0 disables)
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecorderConfig {
    /// Write an artifact for every completed run
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Directory that receives research_results_*.json files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_search_provider() -> String { "tavily".to_string() }
fn default_search_base_url() -> String { "https://api.tavily.com".to_string() }
fn default_max_results() -> usize { 5 }
fn default_search_depth() -> String { "basic".to_string() }
fn default_http_timeout() -> u64 { 30 }
fn default_generation_provider() -> String { "together".to_string() }
fn default_generation_base_url() -> String { "https://api.together.xyz/v1".to_string() }
fn default_generation_model() -> String { "mistralai/Mistral-7B-Instruct-v0.2".to_string() }
fn default_max_tokens() -> u32 { 512 }
fn default_temperature() -> f32 { 0.7 }
fn default_stage_timeout() -> u64 { 60 }
fn default_enabled() -> bool { true }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_log_level() -> String { "info".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("RESEARCH_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with RESEARCH__ prefix
            // e.g., RESEARCH__SEARCH__MAX_RESULTS=3
            .add_source(
                Environment::with_prefix("RESEARCH")
                    .separator("__")
                    .try_parsing(true)
            )

            // Provider keys under their conventional names
            .set_override_option("search.api_key", std::env::var("TAVILY_API_KEY").ok())?
            .set_override_option("generation.api_key", std::env::var("TOGETHER_API_KEY").ok())?

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("RESEARCH")
                    .separator("__")
                    .try_parsing(true)
            )
            .set_override_option("search.api_key", std::env::var("TAVILY_API_KEY").ok())?
            .set_override_option("generation.api_key", std::env::var("TOGETHER_API_KEY").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Per-call bound for capability calls, None when disabled
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.pipeline.stage_timeout()
    }
}

impl PipelineConfig {
    pub fn stage_timeout(&self) -> Option<Duration> {
        match self.stage_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            api_key: None,
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_secs: default_stage_timeout(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            pipeline: PipelineConfig::default(),
            recorder: RecorderConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
