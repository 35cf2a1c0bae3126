//! Result recorder: persists a finished run as a JSON artifact
//!
//! One file per run, named after the local time it was written:
//! `research_results_YYYYMMDD_HHMMSS.json`. Two runs finishing within the
//! same second resolve to the same name and the later write wins.

use crate::errors::{AppError, Result};
use crate::metrics;
use crate::state::{ResearchQuery, StateModel};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Format of the `timestamp` field
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Persisted record of one run; field order is the on-disk order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchArtifact {
    pub query: String,
    pub timestamp: String,
    pub search_results: String,
    pub sources: Vec<String>,
    pub final_answer: String,
}

impl ResearchArtifact {
    pub fn from_state(state: &StateModel, written_at: &DateTime<Local>) -> Self {
        Self {
            query: state.query().as_str().to_string(),
            timestamp: written_at.format(TIMESTAMP_FORMAT).to_string(),
            search_results: state.results().to_string(),
            sources: state.sources().to_vec(),
            final_answer: state.response().to_string(),
        }
    }

    /// Rebuild the state that produced this artifact
    pub fn into_state(self) -> Result<StateModel> {
        let query = ResearchQuery::new(self.query)?;
        Ok(StateModel::from_parts(
            query,
            self.search_results,
            self.sources,
            self.final_answer,
        ))
    }

    /// Pretty JSON with four-space indentation
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

/// File name for an artifact written at `written_at`
pub fn artifact_file_name(written_at: &DateTime<Local>) -> String {
    format!("research_results_{}.json", written_at.format(FILE_STAMP_FORMAT))
}

/// Writes artifacts into a directory
#[derive(Debug, Clone)]
pub struct ResultRecorder {
    output_dir: PathBuf,
    enabled: bool,
}

impl ResultRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            enabled: true,
        }
    }

    /// A recorder that never writes
    pub fn disabled() -> Self {
        Self {
            output_dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist `state` stamped with the current local time
    pub async fn record(&self, state: &StateModel) -> Result<Option<PathBuf>> {
        self.record_at(state, Local::now()).await
    }

    /// Persist `state` stamped with `written_at`.
    ///
    /// Returns `Ok(None)` when the recorder is disabled.
    pub async fn record_at(
        &self,
        state: &StateModel,
        written_at: DateTime<Local>,
    ) -> Result<Option<PathBuf>> {
        if !self.enabled {
            return Ok(None);
        }

        let artifact = ResearchArtifact::from_state(state, &written_at);
        let bytes = artifact.to_json_pretty()?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(artifact_file_name(&written_at));
        tokio::fs::write(&path, bytes).await.map_err(|e| AppError::PersistFailure {
            message: format!("{}: {}", path.display(), e),
        })?;

        metrics::record_artifact(true);
        tracing::info!(path = %path.display(), "Results saved");
        Ok(Some(path))
    }

    /// Read an artifact back from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<ResearchArtifact> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn finished_state() -> StateModel {
        StateModel::new(ResearchQuery::new("rust ownership").unwrap())
            .with_evidence(
                "Ownership prevents data races".to_string(),
                vec!["https://a.example".to_string()],
            )
            .with_response("Rust's ownership model...".to_string())
    }

    fn at(secs: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 15, 14, 5, secs).unwrap()
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(artifact_file_name(&at(7)), "research_results_20250615_140507.json");
    }

    #[test]
    fn test_json_layout() {
        let artifact = ResearchArtifact::from_state(&finished_state(), &at(7));
        let json = String::from_utf8(artifact.to_json_pretty().unwrap()).unwrap();

        let expected = r#"{
    "query": "rust ownership",
    "timestamp": "2025-06-15 14:05:07",
    "search_results": "Ownership prevents data races",
    "sources": [
        "https://a.example"
    ],
    "final_answer": "Rust's ownership model..."
}"#;
        assert_eq!(json, expected);
    }

    #[tokio::test]
    async fn test_record_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = ResultRecorder::new(dir.path());
        let state = finished_state();

        let path = recorder.record_at(&state, at(7)).await.unwrap().unwrap();
        assert_eq!(path, dir.path().join("research_results_20250615_140507.json"));

        let artifact = ResultRecorder::load(&path).await.unwrap();
        assert_eq!(artifact.final_answer, "Rust's ownership model...");
        assert_eq!(artifact.into_state().unwrap(), state);
    }

    #[tokio::test]
    async fn test_distinct_seconds_give_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = ResultRecorder::new(dir.path());
        let state = finished_state();

        let first = recorder.record_at(&state, at(7)).await.unwrap().unwrap();
        let second = recorder.record_at(&state, at(8)).await.unwrap().unwrap();

        assert_ne!(first, second);
        let a = ResultRecorder::load(&first).await.unwrap();
        let b = ResultRecorder::load(&second).await.unwrap();
        assert_eq!(a.query, b.query);
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs").join("today");
        let recorder = ResultRecorder::new(&nested);

        let path = recorder.record_at(&finished_state(), at(1)).await.unwrap().unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_disabled_recorder_writes_nothing() {
        let recorder = ResultRecorder::disabled();
        assert!(!recorder.is_enabled());
        assert_eq!(recorder.record(&finished_state()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unwritable_target_is_persist_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let recorder = ResultRecorder::new(&blocker);
        let err = recorder.record_at(&finished_state(), at(1)).await.unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::PersistFailure);
    }
}
