//! Job Queue Adapter: Redis Streams submission, consumer-group reads, ACK,
//! DLQ, and the `job:<job_id>` state-hash lifecycle.
//!
//! Command shapes (XGROUP CREATE/MKSTREAM, XADD with MAXLEN ~, XREADGROUP
//! with BLOCK, XACK, XTRIM) follow `stream_worker::consumer`/`producer`;
//! this adapter additionally owns the job-hash CRUD the generic stream
//! worker library has no concept of.

use std::collections::HashMap;

use chrono::Utc;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

use crate::config::RedisQueueConfig;
use crate::error::{SearchError, SearchResult};
use crate::models::JobState;

/// A single message pulled off the main stream via the consumer group.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub stream: String,
    pub message_id: String,
    pub fields: HashMap<String, String>,
}

impl QueueMessage {
    pub fn job_id(&self) -> Option<&str> {
        self.fields.get("job_id").map(String::as_str)
    }

    pub fn payload_json(&self) -> Option<&str> {
        self.fields.get("payload_json").map(String::as_str)
    }

    pub fn retries(&self) -> u32 {
        self.fields
            .get("retries")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// The job state hash, decoded from `HGETALL job:<job_id>`.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub state: JobState,
    pub retries: u32,
    pub canceled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
    pub payload_json: String,
    pub result_json: String,
    pub last_error: Option<String>,
}

impl JobRecord {
    fn from_map(job_id: &str, map: &HashMap<String, String>) -> Self {
        Self {
            job_id: job_id.to_string(),
            state: map
                .get("state")
                .and_then(|s| JobState::parse(s))
                .unwrap_or(JobState::Pending),
            retries: map
                .get("retries")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            canceled: map.get("canceled").map(|v| v == "1").unwrap_or(false),
            created_at: map.get("created_at").cloned().unwrap_or_default(),
            updated_at: map.get("updated_at").cloned().unwrap_or_default(),
            completed_at: map.get("completed_at").filter(|v| !v.is_empty()).cloned(),
            payload_json: map.get("payload_json").cloned().unwrap_or_default(),
            result_json: map.get("result_json").cloned().unwrap_or_default(),
            last_error: map.get("last_error").filter(|v| !v.is_empty()).cloned(),
        }
    }
}

/// Redis Streams-backed queue manager for the search job execution plane.
#[derive(Clone)]
pub struct JobQueueAdapter {
    redis: ConnectionManager,
    config: RedisQueueConfig,
}

impl JobQueueAdapter {
    pub fn new(redis: ConnectionManager, config: RedisQueueConfig) -> Self {
        Self { redis, config }
    }

    pub fn config(&self) -> &RedisQueueConfig {
        &self.config
    }

    /// Idempotent consumer-group creation; creates the stream if missing.
    pub async fn ensure_consumer_group(&self) -> SearchResult<()> {
        let mut conn = self.redis.clone();

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_search)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %self.config.stream_search,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(group = %self.config.consumer_group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(SearchError::DependencyUnavailable(format!(
                "redis consumer group creation failed: {e}"
            ))),
        }
    }

    /// Current length of the main stream.
    pub async fn queue_depth(&self) -> SearchResult<i64> {
        let mut conn = self.redis.clone();
        let depth: i64 = conn.xlen(&self.config.stream_search).await?;
        Ok(depth)
    }

    /// Raises `QueueOverloaded` when depth >= `queue_reject_at`.
    pub async fn guard_capacity(&self) -> SearchResult<()> {
        let depth = self.queue_depth().await?;
        if depth >= self.config.queue_reject_at {
            return Err(SearchError::QueueOverloaded {
                depth,
                reject_at: self.config.queue_reject_at,
            });
        }
        Ok(())
    }

    /// Writes the initial job-hash fields and sets its TTL.
    pub async fn create_job_record(&self, job_id: &str, payload_json: &str) -> SearchResult<()> {
        let now = utc_now();
        let key = Self::job_key(job_id);

        let mapping: Vec<(&str, &str)> = vec![
            ("job_id", job_id),
            ("state", "PENDING"),
            ("retries", "0"),
            ("canceled", "0"),
            ("created_at", &now),
            ("updated_at", &now),
            ("module_name", &self.config.module_name),
            ("payload_json", payload_json),
            ("last_error", ""),
            ("result_json", ""),
        ];

        let mut conn = self.redis.clone();
        let _: () = conn.hset_multiple(&key, &mapping).await?;
        let _: () = conn.expire(&key, self.config.result_ttl_sec).await?;
        Ok(())
    }

    /// Trims the stream approximately to `queue_max_len` if over, then
    /// appends the message. Returns the stream-assigned message ID.
    pub async fn enqueue(
        &self,
        job_id: &str,
        payload_json: &str,
        retries: u32,
    ) -> SearchResult<String> {
        self.trim_if_needed().await?;

        let mut conn = self.redis.clone();
        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_search)
            .arg("*")
            .arg("job_id")
            .arg(job_id)
            .arg("payload_json")
            .arg(payload_json)
            .arg("retries")
            .arg(retries.to_string())
            .arg("module_name")
            .arg(&self.config.module_name)
            .arg("enqueued_at")
            .arg(utc_now())
            .query_async(&mut conn)
            .await?;

        Ok(message_id)
    }

    async fn trim_if_needed(&self) -> SearchResult<()> {
        let depth = self.queue_depth().await?;
        if depth <= self.config.queue_max_len {
            return Ok(());
        }

        let mut conn = self.redis.clone();
        let _: () = redis::cmd("XTRIM")
            .arg(&self.config.stream_search)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.config.queue_max_len)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Blocking read from the consumer group with `worker_block_ms` timeout.
    /// Returns an empty list on timeout rather than an error.
    pub async fn read(&self, consumer_name: &str, count: usize) -> SearchResult<Vec<QueueMessage>> {
        let mut conn = self.redis.clone();

        let result: Result<redis::streams::StreamReadReply, redis::RedisError> = conn
            .xread_options(
                &[&self.config.stream_search],
                &[">"],
                &redis::streams::StreamReadOptions::default()
                    .group(&self.config.consumer_group, consumer_name)
                    .count(count)
                    .block(self.config.worker_block_ms as usize),
            )
            .await;

        match result {
            Ok(reply) => Ok(parse_messages(reply)),
            Err(e) => {
                let msg = e.to_string().to_lowercase();
                if msg.contains("timeout") || msg.contains("timed out") {
                    Ok(vec![])
                } else {
                    Err(SearchError::from(e))
                }
            }
        }
    }

    pub async fn ack(&self, message: &QueueMessage) -> SearchResult<()> {
        let mut conn = self.redis.clone();
        let _: () = conn
            .xack(&message.stream, &self.config.consumer_group, &[&message.message_id])
            .await?;
        Ok(())
    }

    /// ACKs after adding a copy of the failing message (plus `moved_at`,
    /// `error`) to the DLQ stream.
    pub async fn move_to_dlq(&self, message: &QueueMessage, error: &str) -> SearchResult<()> {
        let mut conn = self.redis.clone();

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&self.config.stream_search_dlq).arg("*");
        for (key, value) in &message.fields {
            cmd.arg(key).arg(value);
        }
        cmd.arg("moved_at").arg(utc_now());
        cmd.arg("error").arg(error);

        let _: String = cmd.query_async(&mut conn).await?;
        warn!(
            job_id = ?message.job_id(),
            error,
            dlq = %self.config.stream_search_dlq,
            "Moved message to DLQ"
        );
        Ok(())
    }

    pub async fn get_job_record(&self, job_id: &str) -> SearchResult<Option<JobRecord>> {
        let mut conn = self.redis.clone();
        let map: HashMap<String, String> = conn.hgetall(Self::job_key(job_id)).await?;
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(JobRecord::from_map(job_id, &map)))
    }

    /// Generic partial update: always refreshes `updated_at` and re-applies
    /// the job hash's TTL. Every higher-level state transition composes
    /// this primitive, so TTL refresh can never be forgotten by a caller.
    pub async fn update_job_record(
        &self,
        job_id: &str,
        patch: &[(&str, String)],
    ) -> SearchResult<()> {
        let key = Self::job_key(job_id);
        let now = utc_now();

        let mut mapping: Vec<(&str, String)> = patch.to_vec();
        mapping.push(("updated_at", now));

        let mut conn = self.redis.clone();
        let _: () = conn.hset_multiple(&key, &mapping).await?;
        let _: () = conn.expire(&key, self.config.result_ttl_sec).await?;
        Ok(())
    }

    pub async fn mark_running(&self, job_id: &str, retries: u32) -> SearchResult<()> {
        self.update_job_record(
            job_id,
            &[("state", "RUNNING".to_string()), ("retries", retries.to_string())],
        )
        .await
    }

    pub async fn mark_succeeded(&self, job_id: &str, result_json: &str) -> SearchResult<()> {
        self.update_job_record(
            job_id,
            &[
                ("state", "SUCCEEDED".to_string()),
                ("result_json", result_json.to_string()),
                ("completed_at", utc_now()),
                ("last_error", String::new()),
            ],
        )
        .await
    }

    pub async fn mark_failed(&self, job_id: &str, error: &str, retries: u32) -> SearchResult<()> {
        self.update_job_record(
            job_id,
            &[
                ("state", "FAILED".to_string()),
                ("retries", retries.to_string()),
                ("last_error", error.to_string()),
                ("completed_at", utc_now()),
            ],
        )
        .await
    }

    pub async fn mark_pending_retry(
        &self,
        job_id: &str,
        retries: u32,
        error: &str,
    ) -> SearchResult<()> {
        self.update_job_record(
            job_id,
            &[
                ("state", "PENDING".to_string()),
                ("retries", retries.to_string()),
                ("last_error", error.to_string()),
            ],
        )
        .await
    }

    pub async fn mark_canceled(&self, job_id: &str) -> SearchResult<()> {
        self.update_job_record(
            job_id,
            &[
                ("state", "CANCELED".to_string()),
                ("canceled", "1".to_string()),
                ("completed_at", utc_now()),
            ],
        )
        .await
    }

    pub async fn mark_cancel_requested(&self, job_id: &str) -> SearchResult<()> {
        self.update_job_record(job_id, &[("canceled", "1".to_string())])
            .await
    }

    fn job_key(job_id: &str) -> String {
        format!("job:{job_id}")
    }
}

fn parse_messages(reply: redis::streams::StreamReadReply) -> Vec<QueueMessage> {
    let mut out = Vec::new();
    for stream_key in reply.keys {
        for entry in stream_key.ids {
            let mut fields = HashMap::with_capacity(entry.map.len());
            for (field, value) in entry.map {
                let value_str = match value {
                    redis::Value::BulkString(bytes) => String::from_utf8_lossy(&bytes).to_string(),
                    redis::Value::SimpleString(s) => s,
                    other => format!("{other:?}"),
                };
                fields.insert(field, value_str);
            }
            out.push(QueueMessage {
                stream: stream_key.key.clone(),
                message_id: entry.id,
                fields,
            });
        }
    }
    out
}

fn utc_now() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_record_defaults_missing_fields_gracefully() {
        let mut map = HashMap::new();
        map.insert("state".to_string(), "RUNNING".to_string());
        map.insert("retries".to_string(), "2".to_string());

        let record = JobRecord::from_map("abc123", &map);
        assert_eq!(record.job_id, "abc123");
        assert!(matches!(record.state, JobState::Running));
        assert_eq!(record.retries, 2);
        assert!(!record.canceled);
        assert!(record.last_error.is_none());
    }

    #[test]
    fn job_record_parses_canceled_flag() {
        let mut map = HashMap::new();
        map.insert("canceled".to_string(), "1".to_string());
        let record = JobRecord::from_map("job-1", &map);
        assert!(record.canceled);
    }

    #[test]
    fn queue_message_extracts_typed_fields() {
        let mut fields = HashMap::new();
        fields.insert("job_id".to_string(), "job-1".to_string());
        fields.insert("retries".to_string(), "3".to_string());
        let message = QueueMessage {
            stream: "stream_search".to_string(),
            message_id: "1-0".to_string(),
            fields,
        };
        assert_eq!(message.job_id(), Some("job-1"));
        assert_eq!(message.retries(), 3);
    }

    #[test]
    fn queue_message_retries_defaults_to_zero_when_missing() {
        let message = QueueMessage {
            stream: "stream_search".to_string(),
            message_id: "1-0".to_string(),
            fields: HashMap::new(),
        };
        assert_eq!(message.retries(), 0);
    }
}
