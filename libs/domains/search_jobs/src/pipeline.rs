//! Search pipeline: summary search, page fetch, score normalization, and
//! relevance filtering, wired together with the timing and candidate-count
//! accounting that ends up in [`SearchMetrics`].

use std::sync::Arc;
use std::time::Instant;

use crate::error::SearchResult;
use crate::models::{SearchCandidate, SearchJobPayload, SearchMetrics};
use crate::relevance::{apply_relevance_filter, RelevanceJudge, ScoredCandidate};
use crate::repository::SearchRepository;

/// Signals a cooperative cancellation check between pipeline stages. The
/// worker consults the job's `canceled` flag at each of these boundaries so
/// a cancel request shortens tail latency instead of waiting for the whole
/// pipeline to finish.
#[async_trait::async_trait]
pub trait CancellationCheck: Send + Sync {
    async fn is_canceled(&self) -> SearchResult<bool>;
}

/// Outcome of running the pipeline to completion.
pub struct PipelineOutcome {
    pub candidates: Vec<SearchCandidate>,
    pub metrics: SearchMetrics,
    pub canceled: bool,
}

/// Drives summary search -> page fetch -> normalization -> relevance
/// filtering for a single job payload.
pub struct SearchPipeline {
    repository: Arc<dyn SearchRepository>,
    judge: Arc<dyn RelevanceJudge>,
}

impl SearchPipeline {
    pub fn new(repository: Arc<dyn SearchRepository>, judge: Arc<dyn RelevanceJudge>) -> Self {
        Self { repository, judge }
    }

    /// Runs the full pipeline for `payload`, checking `cancellation` at each
    /// stage boundary. Returns early (with `canceled: true` and whatever
    /// metrics were gathered so far) the first time the check reports the
    /// job was canceled.
    pub async fn execute(
        &self,
        payload: &SearchJobPayload,
        cancellation: &dyn CancellationCheck,
    ) -> SearchResult<PipelineOutcome> {
        let started = Instant::now();
        let mut metrics = SearchMetrics::default();

        let summaries = self
            .repository
            .search_summaries(&payload.postgres, &payload.query_embedding, payload.entry_limit)
            .await?;
        metrics.entry_count = summaries.len();

        if cancellation.is_canceled().await? {
            metrics.elapsed_ms = elapsed_ms(started);
            return Ok(PipelineOutcome {
                candidates: Vec::new(),
                metrics,
                canceled: true,
            });
        }

        let pages = self
            .repository
            .fetch_pages(&payload.postgres, &summaries, payload.page_limit)
            .await?;
        metrics.page_count = pages.len();

        if cancellation.is_canceled().await? {
            metrics.elapsed_ms = elapsed_ms(started);
            return Ok(PipelineOutcome {
                candidates: Vec::new(),
                metrics,
                canceled: true,
            });
        }

        // Per the pipeline contract, elapsed_ms covers retrieval (stages 1+2)
        // only; the relevance filter's latency is not part of this figure.
        metrics.elapsed_ms = elapsed_ms(started);

        let scored: Vec<ScoredCandidate> = pages
            .into_iter()
            .map(|page| ScoredCandidate {
                node_id: page.node_id,
                path: page.path,
                score: normalize_similarity(page.parent_similarity),
                content: page.content,
                image_url: page.image_url,
            })
            .collect();

        if cancellation.is_canceled().await? {
            return Ok(PipelineOutcome {
                candidates: Vec::new(),
                metrics,
                canceled: true,
            });
        }

        let candidates =
            apply_relevance_filter(self.judge.as_ref(), &payload.question, scored, payload.top_k)
                .await?;
        metrics.kept_count = candidates.len();

        crate::metrics::record_pipeline_metrics(
            metrics.entry_count,
            metrics.page_count,
            metrics.kept_count,
            metrics.elapsed_ms,
        );

        Ok(PipelineOutcome {
            candidates,
            metrics,
            canceled: false,
        })
    }
}

/// Maps cosine similarity in `[-1, 1]` onto a `[0, 1]` score, matching the
/// bound `SearchCandidate.score` is documented to carry.
fn normalize_similarity(similarity: f32) -> f32 {
    ((similarity + 1.0) / 2.0).clamp(0.0, 1.0)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageNode, PostgresConnectionParams, RelevanceDecision, SummaryNode};
    use crate::relevance::MockRelevanceJudge;
    use crate::repository::MockSearchRepository;

    #[test]
    fn normalize_similarity_maps_full_range_to_unit_interval() {
        assert_eq!(normalize_similarity(1.0), 1.0);
        assert_eq!(normalize_similarity(-1.0), 0.0);
        assert_eq!(normalize_similarity(0.0), 0.5);
    }

    #[test]
    fn normalize_similarity_clamps_out_of_range_inputs() {
        assert_eq!(normalize_similarity(2.0), 1.0);
        assert_eq!(normalize_similarity(-2.0), 0.0);
    }

    struct NeverCanceled;

    #[async_trait::async_trait]
    impl CancellationCheck for NeverCanceled {
        async fn is_canceled(&self) -> SearchResult<bool> {
            Ok(false)
        }
    }

    struct CanceledAfterCalls {
        calls_until_canceled: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CancellationCheck for CanceledAfterCalls {
        async fn is_canceled(&self) -> SearchResult<bool> {
            use std::sync::atomic::Ordering;
            let remaining = self.calls_until_canceled.fetch_sub(1, Ordering::SeqCst);
            Ok(remaining == 0)
        }
    }

    fn test_payload() -> SearchJobPayload {
        SearchJobPayload {
            job_id: "job-1".to_string(),
            question: "battery life".to_string(),
            query_embedding: vec![0.1, 0.2, 0.3, 0.4],
            top_k: 3,
            entry_limit: 5,
            page_limit: 10,
            worker_concurrency: 4,
            postgres: PostgresConnectionParams {
                host: "localhost".into(),
                port: 5432,
                user: "svc".into(),
                password: String::new(),
                database: "vtree".into(),
                summary_table: "summary_nodes".into(),
                page_table: "page_nodes".into(),
                pool_min: 1,
                pool_max: 8,
                connect_timeout_ms: 2000,
                statement_timeout_ms: 3000,
            },
            metadata: None,
        }
    }

    fn summary(node_id: &str, similarity: f32, path: &str) -> SummaryNode {
        SummaryNode {
            node_id: node_id.to_string(),
            document_id: "doc-1".to_string(),
            path: path.to_string(),
            summary_text: format!("summary for {node_id}"),
            similarity,
        }
    }

    fn page(node_id: &str, parent: &str, similarity: f32, path: &str) -> PageNode {
        PageNode {
            node_id: node_id.to_string(),
            parent_node_id: parent.to_string(),
            path: path.to_string(),
            content: format!("content for {node_id}"),
            image_url: None,
            parent_similarity: similarity,
        }
    }

    /// Mirrors the S1 happy-path scenario: two summary hits (0.90, 0.75),
    /// six pages, filter keeps four, top_k=3 truncates the final result.
    #[tokio::test]
    async fn happy_path_truncates_to_top_k_and_reports_metrics() {
        let mut repository = MockSearchRepository::new();
        repository
            .expect_search_summaries()
            .returning(|_, _, _| {
                Ok(vec![
                    summary("s1", 0.90, "doc.a"),
                    summary("s2", 0.75, "doc.b"),
                ])
            });
        repository.expect_fetch_pages().returning(|_, parents, _| {
            assert_eq!(parents.len(), 2);
            Ok(vec![
                page("p1", "s1", 0.90, "doc.a.1"),
                page("p2", "s1", 0.90, "doc.a.2"),
                page("p3", "s1", 0.90, "doc.a.3"),
                page("p4", "s2", 0.75, "doc.b.1"),
                page("p5", "s2", 0.75, "doc.b.2"),
                page("p6", "s2", 0.75, "doc.b.3"),
            ])
        });

        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().returning(|_, candidates| {
            Ok(candidates
                .iter()
                .enumerate()
                .map(|(i, c)| RelevanceDecision {
                    node_id: c.node_id.clone(),
                    keep: i < 4,
                    reason: "relevant enough".to_string(),
                })
                .collect())
        });

        let pipeline = SearchPipeline::new(Arc::new(repository), Arc::new(judge));
        let outcome = pipeline
            .execute(&test_payload(), &NeverCanceled)
            .await
            .unwrap();

        assert!(!outcome.canceled);
        assert_eq!(outcome.metrics.entry_count, 2);
        assert_eq!(outcome.metrics.page_count, 6);
        assert_eq!(outcome.metrics.kept_count, 3);
        assert_eq!(outcome.candidates.len(), 3);
        for candidate in &outcome.candidates {
            assert!(candidate.score >= 0.0 && candidate.score <= 1.0);
        }
    }

    #[tokio::test]
    async fn zero_candidates_short_circuits_filter_with_zero_kept_count() {
        let mut repository = MockSearchRepository::new();
        repository
            .expect_search_summaries()
            .returning(|_, _, _| Ok(vec![summary("s1", 0.5, "doc.a")]));
        repository.expect_fetch_pages().returning(|_, _, _| Ok(vec![]));

        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().times(0);

        let pipeline = SearchPipeline::new(Arc::new(repository), Arc::new(judge));
        let outcome = pipeline
            .execute(&test_payload(), &NeverCanceled)
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.metrics.entry_count, 1);
        assert_eq!(outcome.metrics.page_count, 0);
        assert_eq!(outcome.metrics.kept_count, 0);
    }

    #[tokio::test]
    async fn cancellation_after_summary_stage_short_circuits_before_page_fetch() {
        let mut repository = MockSearchRepository::new();
        repository
            .expect_search_summaries()
            .returning(|_, _, _| Ok(vec![summary("s1", 0.5, "doc.a")]));
        repository.expect_fetch_pages().times(0);

        let judge = MockRelevanceJudge::new();

        let pipeline = SearchPipeline::new(Arc::new(repository), Arc::new(judge));
        let cancellation = CanceledAfterCalls {
            calls_until_canceled: std::sync::atomic::AtomicUsize::new(0),
        };
        let outcome = pipeline.execute(&test_payload(), &cancellation).await.unwrap();

        assert!(outcome.canceled);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.metrics.entry_count, 1);
    }
}
