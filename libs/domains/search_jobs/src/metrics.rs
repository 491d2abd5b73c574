//! Prometheus-compatible metrics for the search job execution plane.
//!
//! Recorder installation is shared with the rest of the process (see
//! `stream_worker::metrics::init_metrics`, which the search-worker binary
//! calls at startup); this module only defines and records the
//! pipeline-specific series layered on top of that recorder, following the
//! naming convention `stream_worker::metrics` already uses
//! (`<domain>_<subject>_<unit>`).

use metrics::{counter, histogram};

pub mod names {
    pub const JOBS_PROCESSED: &str = "search_jobs_processed_total";
    pub const ENTRY_COUNT: &str = "search_jobs_entry_count";
    pub const PAGE_COUNT: &str = "search_jobs_page_count";
    pub const KEPT_COUNT: &str = "search_jobs_kept_count";
    pub const PIPELINE_DURATION: &str = "search_jobs_pipeline_duration_seconds";
    pub const RETRIES: &str = "search_jobs_retries_total";
    pub const DLQ: &str = "search_jobs_dlq_total";
}

/// Outcome of a single job attempt, for labeling [`names::JOBS_PROCESSED`].
#[derive(Debug, Clone, Copy)]
pub enum JobOutcome {
    Succeeded,
    Canceled,
    Retried,
    Failed,
}

impl JobOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Canceled => "canceled",
            Self::Retried => "retried",
            Self::Failed => "failed",
        }
    }
}

/// Records the per-stage candidate counts and retrieval latency for one
/// pipeline run, regardless of whether the relevance filter completed.
pub fn record_pipeline_metrics(
    entry_count: usize,
    page_count: usize,
    kept_count: usize,
    elapsed_ms: u64,
) {
    histogram!(names::ENTRY_COUNT).record(entry_count as f64);
    histogram!(names::PAGE_COUNT).record(page_count as f64);
    histogram!(names::KEPT_COUNT).record(kept_count as f64);
    histogram!(names::PIPELINE_DURATION).record(elapsed_ms as f64 / 1000.0);
}

/// Records the terminal (or retry) outcome of one dequeued message.
pub fn record_job_outcome(outcome: JobOutcome) {
    counter!(names::JOBS_PROCESSED, "outcome" => outcome.as_str()).increment(1);
}

/// Records a retry attempt at the given attempt number.
pub fn record_retry(attempt: u32) {
    counter!(names::RETRIES, "attempt" => attempt.to_string()).increment(1);
}

/// Records a message moved to the dead-letter stream.
pub fn record_dlq() {
    counter!(names::DLQ).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_outcome_labels_are_stable() {
        assert_eq!(JobOutcome::Succeeded.as_str(), "succeeded");
        assert_eq!(JobOutcome::Canceled.as_str(), "canceled");
        assert_eq!(JobOutcome::Retried.as_str(), "retried");
        assert_eq!(JobOutcome::Failed.as_str(), "failed");
    }
}
