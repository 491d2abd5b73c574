//! Integration tests wiring the submission and query surfaces against a
//! real Redis-backed queue. These exercise the job lifecycle a caller
//! actually sees; the pipeline itself (Postgres + relevance judge) is
//! covered separately by pipeline unit tests with mocked dependencies.

use domain_search_jobs::{
    cancel_job, fetch_result, get_job, submit_search, JobQueueAdapter, PostgresSearchConfig,
    RedisQueueConfig, SearchEngineConfig, SearchError, SearchSubmission,
};
use redis::aio::ConnectionManager;
use test_utils::TestRedis;

async fn connection_manager(redis: &TestRedis) -> ConnectionManager {
    let client = redis::Client::open(redis.connection_string()).unwrap();
    client.get_connection_manager().await.unwrap()
}

fn engine_config() -> SearchEngineConfig {
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
            worker_block_ms: 200,
        },
        worker_concurrency: 4,
        max_retries: 3,
        retry_base_ms: 200,
        retry_max_ms: 2000,
        entry_limit: 3,
        page_limit: 50,
    }
}

#[tokio::test]
async fn submit_then_get_job_reports_pending_state() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());
    queue.ensure_consumer_group().await.unwrap();

    let submission = SearchSubmission {
        question: "what is a vtree".to_string(),
        query_embedding: vec![0.1, 0.2, 0.3, 0.4],
        top_k: 5,
        metadata: None,
    };

    let accepted = submit_search(&queue, &config, submission).await.unwrap();
    assert_eq!(accepted.state, "PENDING");

    let status = get_job(&queue, &accepted.job_id).await.unwrap();
    assert_eq!(status.state, "PENDING");
    assert_eq!(status.retries, 0);
    assert!(!status.canceled);

    let messages = queue.read("consumer-a", 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].job_id(), Some(accepted.job_id.as_str()));
}

#[tokio::test]
async fn submit_rejects_embedding_dimension_mismatch_without_touching_redis() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());

    let submission = SearchSubmission {
        question: "what is a vtree".to_string(),
        query_embedding: vec![0.1, 0.2],
        top_k: 5,
        metadata: None,
    };

    let err = submit_search(&queue, &config, submission).await.unwrap_err();
    assert!(matches!(err, SearchError::Configuration(_)));

    let depth = queue.queue_depth().await.unwrap();
    assert_eq!(depth, 0);
}

#[tokio::test]
async fn submit_rejects_when_queue_is_at_reject_threshold() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let mut config = engine_config();
    config.redis.queue_reject_at = 1;
    let queue = JobQueueAdapter::new(manager, config.redis.clone());
    queue.ensure_consumer_group().await.unwrap();

    let submission = |q: Vec<f32>| SearchSubmission {
        question: "what is a vtree".to_string(),
        query_embedding: q,
        top_k: 5,
        metadata: None,
    };

    submit_search(&queue, &config, submission(vec![0.1, 0.2, 0.3, 0.4]))
        .await
        .unwrap();

    let err = submit_search(&queue, &config, submission(vec![0.1, 0.2, 0.3, 0.4]))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::QueueOverloaded { .. }));
}

#[tokio::test]
async fn fetch_result_fails_while_job_is_still_pending() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());
    queue.ensure_consumer_group().await.unwrap();

    let submission = SearchSubmission {
        question: "what is a vtree".to_string(),
        query_embedding: vec![0.1, 0.2, 0.3, 0.4],
        top_k: 5,
        metadata: None,
    };
    let accepted = submit_search(&queue, &config, submission).await.unwrap();

    let err = fetch_result(&queue, &accepted.job_id).await.unwrap_err();
    assert!(matches!(err, SearchError::JobFailed(_)));
}

#[tokio::test]
async fn fetch_result_surfaces_last_error_for_failed_job() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());

    queue.create_job_record("job-1", "{}").await.unwrap();
    queue.mark_failed("job-1", "pipeline exploded", 3).await.unwrap();

    let err = fetch_result(&queue, "job-1").await.unwrap_err();
    match err {
        SearchError::JobFailed(message) => assert_eq!(message, "pipeline exploded"),
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_pending_job_marks_it_canceled_immediately() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());
    queue.ensure_consumer_group().await.unwrap();

    let submission = SearchSubmission {
        question: "what is a vtree".to_string(),
        query_embedding: vec![0.1, 0.2, 0.3, 0.4],
        top_k: 5,
        metadata: None,
    };
    let accepted = submit_search(&queue, &config, submission).await.unwrap();

    let canceled = cancel_job(&queue, &accepted.job_id).await.unwrap();
    assert_eq!(canceled.state, "CANCELED");

    let status = get_job(&queue, &accepted.job_id).await.unwrap();
    assert_eq!(status.state, "CANCELED");
    assert!(status.canceled);
}

#[tokio::test]
async fn cancel_terminal_job_is_idempotent() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());

    queue.create_job_record("job-1", "{}").await.unwrap();
    queue.mark_succeeded("job-1", "{\"candidates\":[],\"metrics\":{\"entry_count\":0,\"page_count\":0,\"kept_count\":0,\"elapsed_ms\":0}}").await.unwrap();

    let result = cancel_job(&queue, "job-1").await.unwrap();
    assert!(result.message.contains("already terminal"));

    // Canceling an already-succeeded job must not flip its recorded state.
    let status = get_job(&queue, "job-1").await.unwrap();
    assert_eq!(status.state, "SUCCEEDED");
}

#[tokio::test]
async fn get_job_fails_for_unknown_job_id() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let config = engine_config();
    let queue = JobQueueAdapter::new(manager, config.redis.clone());

    let err = get_job(&queue, "does-not-exist").await.unwrap_err();
    assert!(matches!(err, SearchError::JobNotFound(_)));
}
