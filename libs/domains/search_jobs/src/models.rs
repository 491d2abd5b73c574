//! Wire and pipeline data types for the search job execution plane.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a search job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Canceled => "CANCELED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(JobState::Pending),
            "RUNNING" => Some(JobState::Running),
            "SUCCEEDED" => Some(JobState::Succeeded),
            "FAILED" => Some(JobState::Failed),
            "CANCELED" => Some(JobState::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Canceled
        )
    }
}

/// Postgres connection parameters embedded in a submission payload.
///
/// Per DESIGN NOTES, the canonical shape is host/port/user/password with the
/// DSN constructed at the boundary rather than threaded around as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub summary_table: String,
    pub page_table: String,
    pub pool_min: u32,
    pub pool_max: u32,
    pub connect_timeout_ms: u64,
    pub statement_timeout_ms: u64,
}

impl PostgresConnectionParams {
    /// Builds the DSN consumed by the Postgres driver. Centralizing
    /// construction here means no other component threads host/port/user
    /// around as a pre-built string.
    pub fn to_dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            urlencoding::encode(&self.database)
        )
    }
}

/// The full pipeline payload a worker rehydrates from `payload_json`.
///
/// This is the well-typed replacement for the dynamic dict the original
/// passes across the worker/engine boundary (see DESIGN NOTES).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobPayload {
    pub job_id: String,
    pub question: String,
    pub query_embedding: Vec<f32>,
    pub top_k: usize,
    pub entry_limit: usize,
    pub page_limit: usize,
    pub worker_concurrency: usize,
    pub postgres: PostgresConnectionParams,
    pub metadata: Option<serde_json::Value>,
}

/// Response returned immediately on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobAccepted {
    pub job_id: String,
    pub state: String,
    pub submitted_at: String,
}

/// Response returned by `get_job`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobStatus {
    pub job_id: String,
    pub state: String,
    pub retries: u32,
    pub canceled: bool,
    pub updated_at: String,
    pub last_error: Option<String>,
}

/// A single search result, ranked and scored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchCandidate {
    pub node_id: String,
    pub path: String,
    pub score: f32,
    pub content: String,
    pub image_url: Option<String>,
    pub reason: String,
}

/// Per-job pipeline accounting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct SearchMetrics {
    pub entry_count: usize,
    pub page_count: usize,
    pub kept_count: usize,
    pub elapsed_ms: u64,
}

/// Response returned by `fetch_result` once a job has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobResult {
    pub job_id: String,
    pub state: String,
    pub candidates: Vec<SearchCandidate>,
    pub metrics: SearchMetrics,
    pub completed_at: String,
}

/// Response returned by `cancel_job`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobCanceled {
    pub job_id: String,
    pub state: String,
    pub message: String,
}

/// A summary-layer row as read from Postgres.
#[derive(Debug, Clone)]
pub struct SummaryNode {
    pub node_id: String,
    pub document_id: String,
    pub path: String,
    pub summary_text: String,
    pub similarity: f32,
}

/// A page-layer row as read from Postgres, still attached to its parent's
/// similarity so the pipeline can normalize a score for it.
#[derive(Debug, Clone)]
pub struct PageNode {
    pub node_id: String,
    pub parent_node_id: String,
    pub path: String,
    pub content: String,
    pub image_url: Option<String>,
    pub parent_similarity: f32,
}

/// Pre-filter candidate, as marshaled to the relevance judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceCandidateInput {
    pub node_id: String,
    pub content: String,
}

/// One decision returned by the relevance judge for a single candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceDecision {
    pub node_id: String,
    pub keep: bool,
    pub reason: String,
}

/// The shape persisted in `result_json`. Job-envelope fields (`job_id`,
/// `state`, `completed_at`) are layered on by the query surface when a
/// caller fetches the result, rather than stored redundantly on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub candidates: Vec<SearchCandidate>,
    pub metrics: SearchMetrics,
}
