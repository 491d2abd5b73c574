//! Worker loop: pulls messages off the queue, drives the pipeline, and
//! reconciles the job-state hash with retry/DLQ bookkeeping.
//!
//! State machine and retry semantics follow the reference worker's
//! `_process_message` method line for line, translated to non-blocking
//! primitives (`tokio::time::sleep` instead of a blocking sleep) per the
//! DESIGN NOTES redesign of backoff delivery.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::SearchEngineConfig;
use crate::error::SearchResult;
use crate::metrics::{record_dlq, record_job_outcome, record_retry, JobOutcome};
use crate::models::{SearchJobPayload, StoredResult};
use crate::pipeline::{CancellationCheck, SearchPipeline};
use crate::queue::{JobQueueAdapter, QueueMessage};

/// Polls the job-state hash for a single in-flight job, used by the
/// pipeline to decide whether to keep going between stages.
struct JobCancellationCheck<'a> {
    queue: &'a JobQueueAdapter,
    job_id: String,
}

#[async_trait::async_trait]
impl CancellationCheck for JobCancellationCheck<'_> {
    async fn is_canceled(&self) -> SearchResult<bool> {
        Ok(self
            .queue
            .get_job_record(&self.job_id)
            .await?
            .map(|r| r.canceled)
            .unwrap_or(false))
    }
}

/// Bundles everything the worker loop needs: the queue adapter, the
/// pipeline, and the retry/backoff configuration.
pub struct SearchWorker {
    queue: JobQueueAdapter,
    pipeline: Arc<SearchPipeline>,
    config: SearchEngineConfig,
}

impl SearchWorker {
    pub fn new(queue: JobQueueAdapter, pipeline: Arc<SearchPipeline>, config: SearchEngineConfig) -> Self {
        Self {
            queue,
            pipeline,
            config,
        }
    }

    /// Reads and processes up to `max_items` messages; returns the number
    /// actually processed.
    pub async fn run_worker_once(&self, consumer_name: &str, max_items: usize) -> SearchResult<usize> {
        let messages = self.queue.read(consumer_name, max_items).await?;
        let processed = messages.len();
        for message in messages {
            self.process_message(&message).await?;
        }
        Ok(processed)
    }

    /// Runs the read-process loop forever, backing off briefly whenever a
    /// batch comes back empty so an idle worker does not spin.
    pub async fn run_worker_forever(&self, consumer_name: &str) -> SearchResult<()> {
        loop {
            let processed = self.run_worker_once(consumer_name, 1).await?;
            if processed == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }

    /// Same loop as [`Self::run_worker_forever`], but exits as soon as
    /// `shutdown` reports a shutdown request, rather than running forever.
    pub async fn run_worker_until_shutdown(
        &self,
        consumer_name: &str,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> SearchResult<()> {
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            tokio::select! {
                result = self.run_worker_once(consumer_name, 1) => {
                    if result? == 0 {
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn process_message(&self, message: &QueueMessage) -> SearchResult<()> {
        let Some(job_id) = message.job_id().map(str::to_string) else {
            self.queue.ack(message).await?;
            return Ok(());
        };

        let Some(record) = self.queue.get_job_record(&job_id).await? else {
            self.queue.ack(message).await?;
            return Ok(());
        };

        if record.canceled {
            self.queue.mark_canceled(&job_id).await?;
            self.queue.ack(message).await?;
            return Ok(());
        }

        let retries = message
            .fields
            .get("retries")
            .and_then(|v| v.parse().ok())
            .unwrap_or(record.retries);
        self.queue.mark_running(&job_id, retries).await?;

        let payload_json = message
            .payload_json()
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(record.payload_json.clone()).filter(|s| !s.is_empty()));

        let Some(payload_json) = payload_json else {
            self.queue
                .mark_failed(&job_id, "payload_json is empty", retries)
                .await?;
            self.queue.move_to_dlq(message, "payload_json-empty").await?;
            self.queue.ack(message).await?;
            return Ok(());
        };

        match self.run_pipeline_for(&job_id, &payload_json).await {
            Ok(RunOutcome::Succeeded(result_json)) => {
                self.queue.mark_succeeded(&job_id, &result_json).await?;
                self.queue.ack(message).await?;
                record_job_outcome(JobOutcome::Succeeded);
            }
            Ok(RunOutcome::Canceled) => {
                self.queue.mark_canceled(&job_id).await?;
                self.queue.ack(message).await?;
                record_job_outcome(JobOutcome::Canceled);
            }
            Err(err) => {
                let next_retry = retries + 1;
                let error_message = err.to_string();

                if next_retry <= self.config.max_retries {
                    let backoff_ms = self.backoff_ms(next_retry);
                    self.queue
                        .mark_pending_retry(&job_id, next_retry, &error_message)
                        .await?;
                    self.queue.enqueue(&job_id, &payload_json, next_retry).await?;
                    warn!(job_id, next_retry, backoff_ms, error = %error_message, "Retrying job after pipeline error");
                    record_retry(next_retry);
                    record_job_outcome(JobOutcome::Retried);
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                } else {
                    // `retries` counts re-enqueues after failure; this branch
                    // never re-enqueues, so the FAILED record keeps the
                    // message's current retry count rather than `next_retry`.
                    self.queue
                        .mark_failed(&job_id, &error_message, retries)
                        .await?;
                    self.queue.move_to_dlq(message, &error_message).await?;
                    error!(job_id, error = %error_message, "Job exhausted retries, moved to DLQ");
                    record_dlq();
                    record_job_outcome(JobOutcome::Failed);
                }

                self.queue.ack(message).await?;
            }
        }

        Ok(())
    }

    async fn run_pipeline_for(&self, job_id: &str, payload_json: &str) -> SearchResult<RunOutcome> {
        let payload: SearchJobPayload = serde_json::from_str(payload_json)?;

        let cancellation = JobCancellationCheck {
            queue: &self.queue,
            job_id: job_id.to_string(),
        };

        let outcome = self.pipeline.execute(&payload, &cancellation).await?;
        if outcome.canceled {
            return Ok(RunOutcome::Canceled);
        }

        let stored = StoredResult {
            candidates: outcome.candidates,
            metrics: outcome.metrics,
        };
        let result_json = serde_json::to_string(&stored)?;

        info!(
            job_id,
            entry_count = stored.metrics.entry_count,
            page_count = stored.metrics.page_count,
            kept_count = stored.metrics.kept_count,
            elapsed_ms = stored.metrics.elapsed_ms,
            "Search job completed"
        );

        Ok(RunOutcome::Succeeded(result_json))
    }

    /// `min(retry_base_ms * 2^(next_retry - 1), retry_max_ms)`.
    fn backoff_ms(&self, next_retry: u32) -> u64 {
        let exponent = next_retry.saturating_sub(1);
        let scaled = self
            .config
            .retry_base_ms
            .saturating_mul(1u64.checked_shl(exponent).unwrap_or(u64::MAX).max(1));
        scaled.min(self.config.retry_max_ms)
    }
}

enum RunOutcome {
    Succeeded(String),
    Canceled,
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
    fn backoff_formula_matches_exponential_cap() {
        let config = test_config();
        let base = config.retry_base_ms;
        let max = config.retry_max_ms;

        let formula = |next_retry: u32| -> u64 {
            let exponent = next_retry.saturating_sub(1);
            (base.saturating_mul(1u64 << exponent)).min(max)
        };

        assert_eq!(formula(1), 200);
        assert_eq!(formula(2), 400);
        assert_eq!(formula(3), 800);
        assert_eq!(formula(4), 1600);
        assert_eq!(formula(5), 2000);
    }
}
