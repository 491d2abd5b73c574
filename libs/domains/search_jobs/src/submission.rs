//! Submission API: validates and accepts a new search request.

use chrono::Utc;
use uuid::Uuid;

use crate::config::SearchEngineConfig;
use crate::error::{SearchError, SearchResult};
use crate::models::{SearchJobAccepted, SearchJobPayload};
use crate::queue::JobQueueAdapter;

/// Inputs a caller supplies when submitting a new search job. Connection
/// parameters and limits are filled in from configuration, not accepted
/// from the caller, so a submission cannot point at an arbitrary database.
pub struct SearchSubmission {
    pub question: String,
    pub query_embedding: Vec<f32>,
    pub top_k: usize,
    pub metadata: Option<serde_json::Value>,
}

/// Validates a submission, mints a job id, writes the initial job record,
/// and enqueues the job for processing.
pub async fn submit_search(
    queue: &JobQueueAdapter,
    config: &SearchEngineConfig,
    submission: SearchSubmission,
) -> SearchResult<SearchJobAccepted> {
    validate_submission(&submission, config)?;

    queue.guard_capacity().await?;

    let job_id = Uuid::new_v4().simple().to_string();

    let payload = SearchJobPayload {
        job_id: job_id.clone(),
        question: submission.question,
        query_embedding: submission.query_embedding,
        top_k: submission.top_k,
        entry_limit: config.entry_limit,
        page_limit: config.page_limit,
        worker_concurrency: config.worker_concurrency,
        postgres: config.postgres.to_params(),
        metadata: submission.metadata,
    };

    let payload_json = serde_json::to_string(&payload)?;

    queue.create_job_record(&job_id, &payload_json).await?;
    queue.enqueue(&job_id, &payload_json, 0).await?;

    Ok(SearchJobAccepted {
        job_id,
        state: "PENDING".to_string(),
        submitted_at: Utc::now().to_rfc3339(),
    })
}

/// Checks `top_k` and embedding dimensionality before any I/O happens, so a
/// malformed submission never touches Redis.
fn validate_submission(
    submission: &SearchSubmission,
    config: &SearchEngineConfig,
) -> SearchResult<()> {
    if submission.top_k < 1 {
        return Err(SearchError::Configuration(
            "top_k must be >= 1".to_string(),
        ));
    }

    if submission.query_embedding.len() != config.postgres.embedding_dim {
        return Err(SearchError::Configuration(format!(
            "query_embedding has {} dimensions, expected {}",
            submission.query_embedding.len(),
            config.postgres.embedding_dim
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PostgresSearchConfig, RedisQueueConfig};

    fn test_config() -> SearchEngineConfig {
        SearchEngineConfig {
            postgres: PostgresSearchConfig {
                host: "localhost".into(),
                port: 5432,
                user: "svc".into(),
                password: String::new(),
                database: "vtree".into(),
                summary_table: "summary_nodes".into(),
                page_table: "page_nodes".into(),
                embedding_dim: 4,
                pool_min: 1,
                pool_max: 8,
                connect_timeout_ms: 2000,
                statement_timeout_ms: 3000,
            },
            redis: RedisQueueConfig {
                host: "localhost".into(),
                port: 6379,
                db: 0,
                username: None,
                password: None,
                use_tls: false,
                stream_search: "stream_search".into(),
                stream_search_dlq: "stream_search_dlq".into(),
                consumer_group: "consumer_group".into(),
                module_name: "VtreeSearch".into(),
                queue_max_len: 200,
                queue_reject_at: 180,
                result_ttl_sec: 900,
                worker_block_ms: 1000,
            },
            worker_concurrency: 4,
            max_retries: 3,
            retry_base_ms: 200,
            retry_max_ms: 2000,
            entry_limit: 3,
            page_limit: 50,
        }
    }

    #[test]
    fn rejects_top_k_below_one() {
        let config = test_config();
        let submission = SearchSubmission {
            question: "what is a vtree".to_string(),
            query_embedding: vec![0.1, 0.2, 0.3, 0.4],
            top_k: 0,
            metadata: None,
        };
        let err = validate_submission(&submission, &config).unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
    }

    #[test]
    fn rejects_embedding_dimension_mismatch() {
        let config = test_config();
        let submission = SearchSubmission {
            question: "what is a vtree".to_string(),
            query_embedding: vec![0.1, 0.2],
            top_k: 5,
            metadata: None,
        };
        let err = validate_submission(&submission, &config).unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
    }

    #[test]
    fn accepts_well_formed_submission() {
        let config = test_config();
        let submission = SearchSubmission {
            question: "what is a vtree".to_string(),
            query_embedding: vec![0.1, 0.2, 0.3, 0.4],
            top_k: 5,
            metadata: None,
        };
        assert!(validate_submission(&submission, &config).is_ok());
    }
}
