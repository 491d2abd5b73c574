//! Relevance filtering: the LLM-backed keep/drop pass applied after page
//! content is assembled.
//!
//! The reference implementation injects a duck-typed chat-model object and
//! serializes an HTTP transport config into the job payload. Per DESIGN
//! NOTES, that capability is modeled here as a single explicit async trait
//! instead — callers inject whichever judge implementation they like (HTTP,
//! in-process model, or a test double) without the pipeline needing to know
//! about transport.

pub mod http;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::{SearchError, SearchResult};
use crate::models::{RelevanceCandidateInput, RelevanceDecision, SearchCandidate};

/// A capability that turns a question plus candidate set into keep/drop
/// decisions. Any response shape violation is a retriable pipeline error,
/// not a terminal configuration error — a transient bad completion should
/// not prevent the job from being retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn judge(
        &self,
        question: &str,
        candidates: &[RelevanceCandidateInput],
    ) -> SearchResult<Vec<RelevanceDecision>>;
}

/// Candidate prior to relevance judgement, carrying everything needed to
/// build a [`SearchCandidate`] once a keep decision and score are known.
pub struct ScoredCandidate {
    pub node_id: String,
    pub path: String,
    pub score: f32,
    pub content: String,
    pub image_url: Option<String>,
}

/// Applies the relevance judge to `candidates` and returns the final,
/// ranked, truncated result set.
///
/// An empty candidate list short-circuits without invoking the judge at
/// all; `kept_count` in that case is zero rather than undefined.
pub async fn apply_relevance_filter(
    judge: &dyn RelevanceJudge,
    question: &str,
    candidates: Vec<ScoredCandidate>,
    top_k: usize,
) -> SearchResult<Vec<SearchCandidate>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let judge_input: Vec<RelevanceCandidateInput> = candidates
        .iter()
        .map(|c| RelevanceCandidateInput {
            node_id: c.node_id.clone(),
            content: c.content.clone(),
        })
        .collect();

    let decisions = judge.judge(question, &judge_input).await?;
    validate_decisions(&judge_input, &decisions)?;

    let reason_by_id: std::collections::HashMap<&str, &RelevanceDecision> = decisions
        .iter()
        .map(|d| (d.node_id.as_str(), d))
        .collect();

    let mut kept: Vec<SearchCandidate> = candidates
        .into_iter()
        .filter_map(|c| {
            let decision = reason_by_id.get(c.node_id.as_str())?;
            if !decision.keep {
                return None;
            }
            Some(SearchCandidate {
                node_id: c.node_id,
                path: c.path,
                score: c.score,
                content: c.content,
                image_url: c.image_url,
                reason: decision.reason.clone(),
            })
        })
        .collect();

    kept.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    kept.truncate(top_k);

    Ok(kept)
}

/// Mirrors the strict multiset-equality check applied to relevance-judge
/// responses: every candidate must receive exactly one decision, and every
/// decision must reference a candidate that was actually offered.
fn validate_decisions(
    candidates: &[RelevanceCandidateInput],
    decisions: &[RelevanceDecision],
) -> SearchResult<()> {
    let expected_ids: HashSet<&str> = candidates.iter().map(|c| c.node_id.as_str()).collect();
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(decisions.len());

    for decision in decisions {
        let id = decision.node_id.as_str();
        if !expected_ids.contains(id) {
            return Err(SearchError::Pipeline(format!(
                "relevance judge returned node_id not in candidate set: {id}"
            )));
        }
        if !seen_ids.insert(id) {
            return Err(SearchError::Pipeline(format!(
                "relevance judge returned duplicate node_id: {id}"
            )));
        }
        if decision.reason.trim().is_empty() {
            return Err(SearchError::Pipeline(format!(
                "relevance judge returned empty reason for node_id: {id}"
            )));
        }
    }

    let mut missing: Vec<&str> = expected_ids.difference(&seen_ids).copied().collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(SearchError::Pipeline(format!(
            "relevance judge response missing node_id(s): {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(node_id: &str, score: f32, path: &str) -> ScoredCandidate {
        ScoredCandidate {
            node_id: node_id.to_string(),
            path: path.to_string(),
            score,
            content: format!("content for {node_id}"),
            image_url: None,
        }
    }

    fn keep(node_id: &str) -> RelevanceDecision {
        RelevanceDecision {
            node_id: node_id.to_string(),
            keep: true,
            reason: "relevant".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_candidates_short_circuit_without_calling_judge() {
        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().times(0);

        let result = apply_relevance_filter(&judge, "q", Vec::new(), 5)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn kept_candidates_are_sorted_by_score_then_path() {
        let mut judge = MockRelevanceJudge::new();
        judge
            .expect_judge()
            .returning(|_, candidates| {
                Ok(candidates
                    .iter()
                    .map(|c| keep(&c.node_id))
                    .collect())
            });

        let candidates = vec![
            candidate("a", 0.5, "z"),
            candidate("b", 0.9, "a"),
            candidate("c", 0.9, "b"),
        ];

        let result = apply_relevance_filter(&judge, "q", candidates, 10)
            .await
            .unwrap();

        assert_eq!(
            result.iter().map(|c| c.node_id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "a"]
        );
    }

    #[tokio::test]
    async fn truncates_to_top_k() {
        let mut judge = MockRelevanceJudge::new();
        judge
            .expect_judge()
            .returning(|_, candidates| Ok(candidates.iter().map(|c| keep(&c.node_id)).collect()));

        let candidates = vec![
            candidate("a", 0.9, "a"),
            candidate("b", 0.8, "b"),
            candidate("c", 0.7, "c"),
        ];

        let result = apply_relevance_filter(&judge, "q", candidates, 2)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn rejects_out_of_set_node_id() {
        let mut judge = MockRelevanceJudge::new();
        judge
            .expect_judge()
            .returning(|_, _| Ok(vec![keep("ghost")]));

        let err = apply_relevance_filter(&judge, "q", vec![candidate("a", 0.5, "a")], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Pipeline(_)));
    }

    #[tokio::test]
    async fn rejects_duplicate_node_id() {
        let mut judge = MockRelevanceJudge::new();
        judge
            .expect_judge()
            .returning(|_, _| Ok(vec![keep("a"), keep("a")]));

        let err = apply_relevance_filter(&judge, "q", vec![candidate("a", 0.5, "a")], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Pipeline(_)));
    }

    #[tokio::test]
    async fn rejects_missing_node_id() {
        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().returning(|_, _| Ok(vec![]));

        let err = apply_relevance_filter(
            &judge,
            "q",
            vec![candidate("a", 0.5, "a"), candidate("b", 0.4, "b")],
            5,
        )
        .await
        .unwrap_err();
        match err {
            SearchError::Pipeline(message) => {
                assert!(message.contains("a"));
                assert!(message.contains("b"));
            }
            other => panic!("expected Pipeline error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_empty_reason() {
        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().returning(|_, _| {
            Ok(vec![RelevanceDecision {
                node_id: "a".to_string(),
                keep: true,
                reason: String::new(),
            }])
        });

        let err = apply_relevance_filter(&judge, "q", vec![candidate("a", 0.5, "a")], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Pipeline(_)));
    }

    #[tokio::test]
    async fn dropped_candidates_are_excluded_from_result() {
        let mut judge = MockRelevanceJudge::new();
        judge.expect_judge().returning(|_, _| {
            Ok(vec![
                keep("a"),
                RelevanceDecision {
                    node_id: "b".to_string(),
                    keep: false,
                    reason: "irrelevant".to_string(),
                },
            ])
        });

        let result = apply_relevance_filter(
            &judge,
            "q",
            vec![candidate("a", 0.5, "a"), candidate("b", 0.9, "b")],
            5,
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].node_id, "a");
    }
}
