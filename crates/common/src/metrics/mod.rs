//! Metrics and observability utilities
//!
//! Counters and histograms for pipeline runs, stage latency and
//! degraded stages. Nothing is exported unless the host installs a
//! metrics recorder; without one every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all research pipeline metrics
pub const METRICS_PREFIX: &str = "deepresearch";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_pipeline_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of completed pipeline runs"
    );

    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Stage latency in seconds"
    );

    describe_counter!(
        format!("{}_stage_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Stages that degraded to their input state"
    );

    describe_gauge!(
        format!("{}_evidence_items_count", METRICS_PREFIX),
        Unit::Count,
        "Number of evidence items returned by the last search"
    );

    describe_counter!(
        format!("{}_artifacts_written_total", METRICS_PREFIX),
        Unit::Count,
        "Result artifacts written or failed"
    );

    tracing::debug!("Metrics registered");
}

/// Helper to time a single stage
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    /// Start timing a stage
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    /// Record the stage outcome, returning the elapsed seconds
    pub fn finish(self, success: bool) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();
        record_stage(self.stage, duration, success);
        duration
    }
}

/// Helper to record stage metrics
pub fn record_stage(stage: &str, duration_secs: f64, success: bool) {
    histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        "stage" => stage.to_string()
    )
    .record(duration_secs);

    if !success {
        counter!(
            format!("{}_stage_failures_total", METRICS_PREFIX),
            "stage" => stage.to_string()
        )
        .increment(1);
    }
}

/// Helper to record how much evidence a search produced
pub fn record_evidence(count: usize) {
    gauge!(format!("{}_evidence_items_count", METRICS_PREFIX)).set(count as f64);
}

/// Helper to record a completed run
pub fn record_run() {
    counter!(format!("{}_pipeline_runs_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record artifact persistence
pub fn record_artifact(success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_artifacts_written_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}
