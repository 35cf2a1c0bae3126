//! Deep Research Common Library
//!
//! Shared code for the research pipeline including:
//! - Research state model
//! - Search and text generation capabilities
//! - The research → answer pipeline and result recorder
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod state;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use generation::GenerationCapability;
pub use pipeline::{Orchestrator, ResearchOutcome, ResultRecorder};
pub use search::{Evidence, SearchCapability};
pub use state::{ResearchQuery, StateModel};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build an orchestrator from configuration
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let search = search::create_search(&config.search)?;
    let generator = generation::create_generator(&config.generation)?;

    let recorder = if config.recorder.enabled {
        ResultRecorder::new(config.recorder.output_dir.clone())
    } else {
        ResultRecorder::disabled()
    };

    tracing::info!(
        search = search.provider_name(),
        model = generator.model_name(),
        recorder = recorder.is_enabled(),
        output_dir = %recorder.output_dir().display(),
        "Research pipeline configured"
    );

    Ok(Orchestrator::new(
        search,
        generator,
        recorder,
        std::sync::Arc::new(pipeline::TracingReporter),
        config.stage_timeout(),
    ))
}
