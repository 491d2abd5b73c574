//! Integration tests for the Redis Streams job queue.
//!
//! These tests use a real Redis container via testcontainers to exercise
//! consumer-group mechanics, capacity backpressure, and the job-state hash
//! lifecycle end to end.

use domain_search_jobs::{JobQueueAdapter, RedisQueueConfig};
use redis::aio::ConnectionManager;
use test_utils::TestRedis;

fn test_config(overrides: impl FnOnce(&mut RedisQueueConfig)) -> RedisQueueConfig {
    let mut config = RedisQueueConfig {
        host: "unused".into(),
        port: 0,
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
    };
    overrides(&mut config);
    config
}

async fn connection_manager(redis: &TestRedis) -> ConnectionManager {
    let client = redis::Client::open(redis.connection_string()).unwrap();
    client.get_connection_manager().await.unwrap()
}

#[tokio::test]
async fn ensure_consumer_group_is_idempotent() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    queue.ensure_consumer_group().await.unwrap();
    // Calling a second time must not surface the BUSYGROUP error.
    queue.ensure_consumer_group().await.unwrap();
}

#[tokio::test]
async fn enqueue_then_read_round_trips_job_fields() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    queue.ensure_consumer_group().await.unwrap();
    queue.create_job_record("job-1", "{\"question\":\"hi\"}").await.unwrap();
    queue.enqueue("job-1", "{\"question\":\"hi\"}", 0).await.unwrap();

    let messages = queue.read("consumer-a", 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].job_id(), Some("job-1"));
    assert_eq!(messages[0].payload_json(), Some("{\"question\":\"hi\"}"));
    assert_eq!(messages[0].retries(), 0);

    queue.ack(&messages[0]).await.unwrap();
}

#[tokio::test]
async fn read_returns_empty_on_block_timeout() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    queue.ensure_consumer_group().await.unwrap();
    let messages = queue.read("consumer-a", 10).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn guard_capacity_rejects_once_reject_at_is_reached() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(
        manager,
        test_config(|c| {
            c.queue_max_len = 5;
            c.queue_reject_at = 2;
        }),
    );

    queue.ensure_consumer_group().await.unwrap();
    queue.guard_capacity().await.unwrap();

    queue.enqueue("job-1", "{}", 0).await.unwrap();
    queue.guard_capacity().await.unwrap();

    queue.enqueue("job-2", "{}", 0).await.unwrap();
    let err = queue.guard_capacity().await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("overload") || matches!(
        err,
        domain_search_jobs::SearchError::QueueOverloaded { .. }
    ));
}

#[tokio::test]
async fn trim_keeps_stream_near_max_len() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(
        manager,
        test_config(|c| {
            c.queue_max_len = 3;
            c.queue_reject_at = 1000;
        }),
    );

    queue.ensure_consumer_group().await.unwrap();
    for i in 0..10 {
        queue.enqueue(&format!("job-{i}"), "{}", 0).await.unwrap();
    }

    let depth = queue.queue_depth().await.unwrap();
    // XTRIM MAXLEN ~ is approximate, so only assert it stayed well below
    // the pre-trim depth of 10 rather than pinning an exact count.
    assert!(depth < 10, "expected trimming to reduce depth, got {depth}");
}

#[tokio::test]
async fn job_record_lifecycle_tracks_state_transitions() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    queue.create_job_record("job-1", "{}").await.unwrap();
    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(matches!(record.state, domain_search_jobs::JobState::Pending));
    assert_eq!(record.retries, 0);
    assert!(!record.canceled);

    queue.mark_running("job-1", 0).await.unwrap();
    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(matches!(record.state, domain_search_jobs::JobState::Running));

    queue.mark_pending_retry("job-1", 1, "transient failure").await.unwrap();
    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(matches!(record.state, domain_search_jobs::JobState::Pending));
    assert_eq!(record.retries, 1);
    assert_eq!(record.last_error.as_deref(), Some("transient failure"));

    queue.mark_succeeded("job-1", "{\"candidates\":[]}").await.unwrap();
    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(matches!(record.state, domain_search_jobs::JobState::Succeeded));
    assert!(record.completed_at.is_some());
    assert_eq!(record.result_json, "{\"candidates\":[]}");
}

#[tokio::test]
async fn cancel_request_then_worker_ack_marks_job_canceled() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    queue.create_job_record("job-1", "{}").await.unwrap();
    queue.mark_cancel_requested("job-1").await.unwrap();

    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(record.canceled);
    // Cancellation alone does not move the job to a terminal state; the
    // worker observes the flag and finalizes it.
    assert!(matches!(record.state, domain_search_jobs::JobState::Pending));

    queue.mark_canceled("job-1").await.unwrap();
    let record = queue.get_job_record("job-1").await.unwrap().unwrap();
    assert!(matches!(record.state, domain_search_jobs::JobState::Canceled));
}

#[tokio::test]
async fn move_to_dlq_copies_message_fields_and_appends_error() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager.clone(), test_config(|_| {}));

    queue.ensure_consumer_group().await.unwrap();
    queue.enqueue("job-1", "{\"question\":\"hi\"}", 3).await.unwrap();
    let messages = queue.read("consumer-a", 10).await.unwrap();
    let message = &messages[0];

    queue.move_to_dlq(message, "exhausted retries").await.unwrap();
    queue.ack(message).await.unwrap();

    let mut conn = manager;
    let dlq_len: i64 = redis::AsyncCommands::xlen(&mut conn, "stream_search_dlq")
        .await
        .unwrap();
    assert_eq!(dlq_len, 1);
}

#[tokio::test]
async fn get_job_record_returns_none_for_unknown_job() {
    let redis = TestRedis::new().await;
    let manager = connection_manager(&redis).await;
    let queue = JobQueueAdapter::new(manager, test_config(|_| {}));

    let record = queue.get_job_record("does-not-exist").await.unwrap();
    assert!(record.is_none());
}
