//! Orchestrator: runs research then answer, then records the result

use super::{
    AnswerStage, FailureKind, FailureReporter, PipelinePhase, ResearchStage, ResultRecorder,
    StageFailure,
};
use crate::generation::GenerationCapability;
use crate::metrics;
use crate::search::SearchCapability;
use crate::state::{ResearchQuery, StateModel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// What a run hands back to its caller
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    /// Drafted answer; empty when drafting failed
    pub answer: String,

    /// Evidence URLs; empty when research failed or found nothing
    pub sources: Vec<String>,

    /// Where the run was persisted, if it was
    pub artifact: Option<PathBuf>,
}

/// Fixed two-stage research pipeline
pub struct Orchestrator {
    research: ResearchStage,
    answer: AnswerStage,
    recorder: ResultRecorder,
    reporter: Arc<dyn FailureReporter>,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn SearchCapability>,
        generator: Arc<dyn GenerationCapability>,
        recorder: ResultRecorder,
        reporter: Arc<dyn FailureReporter>,
        stage_timeout: Option<Duration>,
    ) -> Self {
        Self {
            research: ResearchStage::new(search, reporter.clone(), stage_timeout),
            answer: AnswerStage::new(generator, reporter.clone(), stage_timeout),
            recorder,
            reporter,
        }
    }

    /// Run the pipeline to completion. Never fails: degraded stages and
    /// persistence errors are reported, not returned.
    pub async fn run(&self, query: ResearchQuery) -> ResearchOutcome {
        let span = tracing::info_span!("research_run", query = %query);
        self.run_inner(query).instrument(span).await
    }

    async fn run_inner(&self, query: ResearchQuery) -> ResearchOutcome {
        let started = Instant::now();
        let mut phase = PipelinePhase::Init;
        let state = StateModel::new(query);

        phase = advance(phase, PipelinePhase::Researching);
        let state = self.research.run(state).await;

        phase = advance(phase, PipelinePhase::Answering);
        let state = self.answer.run(state).await;

        advance(phase, PipelinePhase::Done);
        let artifact = self.persist(&state).await;
        metrics::record_run();

        tracing::info!(
            sources = state.sources().len(),
            answered = !state.response().is_empty(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Research run finished"
        );

        let (answer, sources) = state.into_answer();
        ResearchOutcome {
            answer,
            sources,
            artifact,
        }
    }

    async fn persist(&self, state: &StateModel) -> Option<PathBuf> {
        match self.recorder.record(state).await {
            Ok(path) => path,
            Err(e) => {
                self.reporter.report(&StageFailure::new(FailureKind::Persist, &e));
                None
            }
        }
    }
}

fn advance(from: PipelinePhase, to: PipelinePhase) -> PipelinePhase {
    tracing::debug!(from = ?from, to = ?to, "Pipeline phase change");
    to
}
