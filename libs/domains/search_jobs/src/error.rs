//! Error taxonomy for the search job execution plane.

use thiserror::Error;

/// Errors surfaced across submission, lookup, and worker-loop processing.
///
/// Variants map onto the error kinds of the execution plane rather than the
/// underlying transport: a `Dependency` failure can originate from either
/// Redis or Postgres, but callers only need to know a dependency could not
/// be reached.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("search queue is overloaded: depth={depth}, reject_at={reject_at}")]
    QueueOverloaded { depth: i64, reject_at: i64 },

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job expired: {0}")]
    JobExpired(String),

    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("retriable pipeline error: {0}")]
    Pipeline(String),
}

impl SearchError {
    /// Whether this error should be retried by the worker loop rather than
    /// surfaced immediately. Only pipeline errors are retriable; everything
    /// else (malformed config, missing jobs, exhausted capacity) is either a
    /// caller-facing failure or already terminal.
    pub fn is_retriable(&self) -> bool {
        matches!(self, SearchError::Pipeline(_))
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

impl From<redis::RedisError> for SearchError {
    fn from(err: redis::RedisError) -> Self {
        SearchError::DependencyUnavailable(format!("redis: {err}"))
    }
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        SearchError::Pipeline(format!("postgres: {err}"))
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Pipeline(format!("json: {err}"))
    }
}

impl From<core_config::ConfigError> for SearchError {
    fn from(err: core_config::ConfigError) -> Self {
        SearchError::Configuration(err.to_string())
    }
}
