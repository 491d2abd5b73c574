//! Search job execution plane: submission, queueing, retrieval pipeline,
//! relevance filtering, and the worker loop that drives jobs to completion.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod queue;
pub mod query;
pub mod relevance;
pub mod repository;
pub mod submission;
pub mod worker;

pub use config::{PostgresSearchConfig, RedisQueueConfig, SearchEngineConfig};
pub use error::{SearchError, SearchResult};
pub use models::{
    JobState, PageNode, PostgresConnectionParams, RelevanceCandidateInput, RelevanceDecision,
    SearchCandidate, SearchJobAccepted, SearchJobCanceled, SearchJobPayload, SearchJobResult,
    SearchJobStatus, SearchMetrics, StoredResult, SummaryNode,
};
pub use pipeline::{CancellationCheck, PipelineOutcome, SearchPipeline};
pub use query::{cancel_job, fetch_result, get_job};
pub use queue::{JobQueueAdapter, JobRecord, QueueMessage};
pub use relevance::http::{HttpRelevanceJudge, HttpRelevanceJudgeConfig};
pub use relevance::{apply_relevance_filter, RelevanceJudge, ScoredCandidate};
pub use repository::{PgSearchRepository, SearchRepository};
pub use submission::{submit_search, SearchSubmission};
pub use worker::SearchWorker;

#[cfg(test)]
pub use relevance::MockRelevanceJudge;
#[cfg(test)]
pub use repository::MockSearchRepository;
