//! Research stage: gathers evidence for the query

use super::{bounded, FailureKind, FailureReporter, StageFailure};
use crate::metrics::{self, StageTimer};
use crate::search::SearchCapability;
use crate::state::StateModel;
use std::sync::Arc;
use std::time::Duration;

pub struct ResearchStage {
    search: Arc<dyn SearchCapability>,
    reporter: Arc<dyn FailureReporter>,
    timeout: Option<Duration>,
}

impl ResearchStage {
    pub fn new(
        search: Arc<dyn SearchCapability>,
        reporter: Arc<dyn FailureReporter>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            search,
            reporter,
            timeout,
        }
    }

    /// Replace `results` and `sources` with fresh evidence.
    ///
    /// On any search failure the input state is returned untouched.
    pub async fn run(&self, state: StateModel) -> StateModel {
        let timer = StageTimer::start("research");
        let outcome = bounded(self.timeout, "search", self.search.search(state.query().as_str())).await;

        match outcome {
            Ok(evidence) => {
                let elapsed = timer.finish(true);
                metrics::record_evidence(evidence.len());
                tracing::info!(
                    provider = self.search.provider_name(),
                    evidence = evidence.len(),
                    elapsed_secs = elapsed,
                    "Research stage completed"
                );

                let (texts, sources): (Vec<String>, Vec<String>) = evidence
                    .into_iter()
                    .map(|item| (item.content, item.url))
                    .unzip();

                state.with_evidence(texts.join("\n"), sources)
            }
            Err(e) => {
                timer.finish(false);
                self.reporter.report(&StageFailure::new(FailureKind::Search, &e));
                state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FakeSearch, RecordingReporter, Script};
    use crate::search::Evidence;
    use crate::state::ResearchQuery;

    fn initial(query: &str) -> StateModel {
        StateModel::new(ResearchQuery::new(query).unwrap())
    }

    #[tokio::test]
    async fn test_joins_evidence_in_order() {
        let search = Arc::new(FakeSearch::new(Script::Succeed(vec![
            Evidence::new("Ownership prevents data races", "https://a.example"),
            Evidence::new("Borrowing is checked at compile time", "https://b.example"),
        ])));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = ResearchStage::new(search.clone(), reporter.clone(), None);

        let state = stage.run(initial("rust ownership")).await;

        assert_eq!(
            state.results(),
            "Ownership prevents data races\nBorrowing is checked at compile time"
        );
        assert_eq!(state.sources(), ["https://a.example", "https://b.example"]);
        assert_eq!(state.query().as_str(), "rust ownership");
        assert_eq!(state.response(), "");
        assert_eq!(search.queries.lock().unwrap().as_slice(), ["rust ownership"]);
        assert!(reporter.failures().is_empty());
    }

    #[tokio::test]
    async fn test_empty_evidence_is_valid() {
        let search = Arc::new(FakeSearch::new(Script::Succeed(Vec::new())));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = ResearchStage::new(search, reporter.clone(), None);

        let state = stage.run(initial("obscure topic")).await;

        assert_eq!(state.results(), "");
        assert!(state.sources().is_empty());
        assert!(reporter.failures().is_empty());
    }

    #[tokio::test]
    async fn test_failure_returns_input_state() {
        let search = Arc::new(FakeSearch::new(Script::Fail("503".to_string())));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = ResearchStage::new(search, reporter.clone(), None);

        let input = initial("rust ownership")
            .with_evidence("earlier".to_string(), vec!["https://old.example".to_string()]);
        let output = stage.run(input.clone()).await;

        assert_eq!(output, input);
        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::Search);
        assert!(failures[0].message.contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades() {
        let search = Arc::new(FakeSearch::new(Script::Hang));
        let reporter = Arc::new(RecordingReporter::default());
        let stage = ResearchStage::new(search, reporter.clone(), Some(Duration::from_secs(10)));

        let input = initial("rust ownership");
        let output = stage.run(input.clone()).await;

        assert_eq!(output, input);
        assert!(reporter.failures()[0].message.contains("timed out"));
    }
}
