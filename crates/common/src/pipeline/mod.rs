//! Research pipeline
//!
//! A fixed two-stage flow: research gathers evidence, answer drafts a
//! response from it, and the recorder persists the final state.
//! Stage failures never abort a run; the failing stage hands back its
//! input state and the failure goes to a [`FailureReporter`].

mod answer;
mod orchestrator;
mod recorder;
mod research;

pub use answer::{render_prompt, AnswerStage};
pub use orchestrator::{Orchestrator, ResearchOutcome};
pub use recorder::{artifact_file_name, ResearchArtifact, ResultRecorder};
pub use research::ResearchStage;

use crate::errors::{AppError, ErrorCode, Result};
use crate::metrics;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Phases of a single run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Init,
    Researching,
    Answering,
    Done,
}

/// Failure classes a run can absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Evidence retrieval failed
    Search,
    /// Answer generation failed
    Draft,
    /// Writing the artifact failed
    Persist,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Search => "search",
            FailureKind::Draft => "draft",
            FailureKind::Persist => "persist",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that was contained inside the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub kind: FailureKind,
    pub code: ErrorCode,
    pub message: String,
}

impl StageFailure {
    pub fn new(kind: FailureKind, error: &AppError) -> Self {
        Self {
            kind,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Channel for contained failures
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &StageFailure);
}

/// Reports failures through tracing and metrics
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: &StageFailure) {
        match failure.kind {
            FailureKind::Persist => {
                metrics::record_artifact(false);
                tracing::error!(
                    kind = %failure.kind,
                    code = failure.code.as_code(),
                    error = %failure.message,
                    "Failed to save research results"
                );
            }
            FailureKind::Search | FailureKind::Draft => {
                tracing::warn!(
                    kind = %failure.kind,
                    code = failure.code.as_code(),
                    error = %failure.message,
                    "Stage failed, continuing with unchanged state"
                );
            }
        }
    }
}

/// Run a capability call, bounded by `limit` when one is set
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AppError::Timeout {
                operation: operation.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => call.await,
    }
}
