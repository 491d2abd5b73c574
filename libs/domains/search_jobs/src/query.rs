//! Query surface: status lookup, result retrieval, and cancellation.

use crate::error::{SearchError, SearchResult};
use crate::models::{JobState, SearchJobCanceled, SearchJobResult, SearchJobStatus, StoredResult};
use crate::queue::JobQueueAdapter;

/// Returns the current lifecycle state for a job.
pub async fn get_job(queue: &JobQueueAdapter, job_id: &str) -> SearchResult<SearchJobStatus> {
    let record = queue
        .get_job_record(job_id)
        .await?
        .ok_or_else(|| SearchError::JobNotFound(job_id.to_string()))?;

    Ok(SearchJobStatus {
        job_id: record.job_id,
        state: record.state.as_str().to_string(),
        retries: record.retries,
        canceled: record.canceled,
        updated_at: record.updated_at,
        last_error: record.last_error,
    })
}

/// Returns the finished result for a job, failing if the job is missing,
/// still in flight, or did not succeed.
pub async fn fetch_result(queue: &JobQueueAdapter, job_id: &str) -> SearchResult<SearchJobResult> {
    let record = queue
        .get_job_record(job_id)
        .await?
        .ok_or_else(|| SearchError::JobExpired(job_id.to_string()))?;

    if record.state == JobState::Failed {
        let message = record
            .last_error
            .clone()
            .unwrap_or_else(|| "job failed with no recorded error".to_string());
        return Err(SearchError::JobFailed(message));
    }

    if record.state != JobState::Succeeded {
        return Err(SearchError::JobFailed(format!(
            "job state is not SUCCEEDED: {}",
            record.state.as_str()
        )));
    }

    if record.result_json.is_empty() {
        return Err(SearchError::JobFailed(
            "job is marked SUCCEEDED but has no stored result".to_string(),
        ));
    }

    let stored: StoredResult = serde_json::from_str(&record.result_json)?;
    let completed_at = record
        .completed_at
        .clone()
        .unwrap_or_else(|| record.updated_at.clone());

    Ok(SearchJobResult {
        job_id: record.job_id,
        state: JobState::Succeeded.as_str().to_string(),
        candidates: stored.candidates,
        metrics: stored.metrics,
        completed_at,
    })
}

/// Requests cancellation of a job. Terminal jobs are a no-op that reports
/// their existing state rather than an error; pending jobs are canceled
/// immediately since no worker has claimed them yet, while running jobs are
/// just flagged and rely on the worker's cooperative cancellation checks.
pub async fn cancel_job(queue: &JobQueueAdapter, job_id: &str) -> SearchResult<SearchJobCanceled> {
    let record = queue
        .get_job_record(job_id)
        .await?
        .ok_or_else(|| SearchError::JobNotFound(job_id.to_string()))?;

    if record.state.is_terminal() {
        return Ok(SearchJobCanceled {
            job_id: record.job_id,
            state: JobState::Canceled.as_str().to_string(),
            message: format!(
                "already terminal: current_state={}",
                record.state.as_str()
            ),
        });
    }

    queue.mark_cancel_requested(job_id).await?;
    if record.state == JobState::Pending {
        queue.mark_canceled(job_id).await?;
    }

    Ok(SearchJobCanceled {
        job_id: job_id.to_string(),
        state: JobState::Canceled.as_str().to_string(),
        message: "cancel request accepted".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchCandidate, SearchMetrics};

    #[test]
    fn stored_result_round_trips_through_json() {
        let stored = StoredResult {
            candidates: vec![SearchCandidate {
                node_id: "n1".into(),
                path: "/a".into(),
                score: 0.8,
                content: "hello".into(),
                image_url: None,
                reason: "relevant".into(),
            }],
            metrics: SearchMetrics {
                entry_count: 1,
                page_count: 1,
                kept_count: 1,
                elapsed_ms: 12,
            },
        };

        let json = serde_json::to_string(&stored).unwrap();
        let roundtripped: StoredResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtripped.candidates.len(), 1);
        assert_eq!(roundtripped.metrics.kept_count, 1);
    }
}
