//! Answer stage: drafts a response from the gathered evidence

use super::{bounded, FailureKind, FailureReporter, StageFailure};
use crate::generation::GenerationCapability;
use crate::metrics::StageTimer;
use crate::state::StateModel;
use std::sync::Arc;
use std::time::Duration;

/// Build the drafting prompt for a state
pub fn render_prompt(state: &StateModel) -> String {
    format!(
        "Based on the research findings below, draft a well-structured answer:\n\
        Query: {}\n\
        Research Data: {}\n\
        Sources: {}",
        state.query(),
        state.results(),
        state.sources().join("\n")
    )
}

pub struct AnswerStage {
    generator: Arc<dyn GenerationCapability>,
    reporter: Arc<dyn FailureReporter>,
    timeout: Option<Duration>,
}

impl AnswerStage {
    pub fn new(
        generator: Arc<dyn GenerationCapability>,
        reporter: Arc<dyn FailureReporter>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            generator,
            reporter,
            timeout,
        }
    }

    /// Replace `response` with a drafted answer.
    ///
    /// Runs on degraded input too; on generation failure the input state
    /// is returned untouched.
    pub async fn run(&self, state: StateModel) -> StateModel {
        let prompt = render_prompt(&state);
        tracing::debug!(
            model = self.generator.model_name(),
            prompt_chars = prompt.len(),
            "Drafting answer"
        );

        let timer = StageTimer::start("answer");
        match bounded(self.timeout, "generate", self.generator.generate(&prompt)).await {
            Ok(response) => {
                let elapsed = timer.finish(true);
                tracing::info!(
                    model = self.generator.model_name(),
                    answer_chars = response.len(),
                    elapsed_secs = elapsed,
                    "Answer stage completed"
                );
                state.with_response(response)
            }
            Err(e) => {
                timer.finish(false);
                self.reporter.report(&StageFailure::new(FailureKind::Draft, &e));
                state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FakeGenerator, RecordingReporter, Script};
    use crate::state::ResearchQuery;

    fn researched() -> StateModel {
        StateModel::new(ResearchQuery::new("rust ownership").unwrap()).with_evidence(
            "Ownership prevents data races\nMoves transfer ownership".to_string(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()],
        )
    }

    #[test]
    fn test_prompt_template() {
        let prompt = render_prompt(&researched());
        assert_eq!(
            prompt,
            "Based on the research findings below, draft a well-structured answer:\n\
             Query: rust ownership\n\
             Research Data: Ownership prevents data races\nMoves transfer ownership\n\
             Sources: https://a.example\nhttps://b.example"
        );
    }

    #[test]
    fn test_prompt_with_no_evidence() {
        let state = StateModel::new(ResearchQuery::new("q").unwrap());
        assert_eq!(
            render_prompt(&state),
            "Based on the research findings below, draft a well-structured answer:\n\
             Query: q\nResearch Data: \nSources: "
        );
    }

    #[tokio::test]
    async fn test_sets_response() {
        let generator = Arc::new(FakeGenerator::new(Script::Succeed(
            "Rust's ownership model...".to_string(),
        )));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = AnswerStage::new(generator.clone(), reporter.clone(), None);

        let input = researched();
        let output = stage.run(input.clone()).await;

        assert_eq!(output.response(), "Rust's ownership model...");
        assert_eq!(output.results(), input.results());
        assert_eq!(output.sources(), input.sources());
        assert_eq!(generator.last_prompt().unwrap(), render_prompt(&input));
        assert!(reporter.failures().is_empty());
    }

    #[tokio::test]
    async fn test_failure_returns_input_state() {
        let generator = Arc::new(FakeGenerator::new(Script::Fail("rate limited".to_string())));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = AnswerStage::new(generator.clone(), reporter.clone(), None);

        let input = researched();
        let output = stage.run(input.clone()).await;

        assert_eq!(output, input);
        assert_eq!(output.response(), "");
        assert_eq!(generator.calls(), 1);
        assert_eq!(reporter.failures()[0].kind, FailureKind::Draft);
    }
}
