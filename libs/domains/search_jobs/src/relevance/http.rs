//! HTTP-backed [`RelevanceJudge`](super::RelevanceJudge): calls an
//! OpenAI-compatible chat-completions endpoint and parses its JSON response
//! into keep/drop decisions.
//!
//! Mirrors `domain_vector::embedding::openai::OpenAIProvider` — a thin
//! `reqwest::Client` plus a config struct read from the environment, one
//! provider satisfying the domain's capability trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::models::{RelevanceCandidateInput, RelevanceDecision};

use super::RelevanceJudge;

/// Connection details for the chat-completions endpoint backing the
/// relevance judge.
#[derive(Debug, Clone)]
pub struct HttpRelevanceJudgeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl HttpRelevanceJudgeConfig {
    pub fn from_env() -> SearchResult<Self> {
        let api_key = std::env::var("SEARCH_RELEVANCE_API_KEY").map_err(|_| {
            SearchError::Configuration("SEARCH_RELEVANCE_API_KEY not set".to_string())
        })?;
        let base_url = std::env::var("SEARCH_RELEVANCE_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("SEARCH_RELEVANCE_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

/// Relevance judge backed by a real chat-completions call.
///
/// The system prompt pins down the exact contract §6 requires: one decision
/// per candidate, order-free, `{node_id, keep, reason}`. Shape enforcement
/// beyond "parses as a JSON array" is left to
/// [`apply_relevance_filter`](super::apply_relevance_filter) — this adapter
/// only owns getting bytes off the wire and decoding them.
pub struct HttpRelevanceJudge {
    client: Client,
    config: HttpRelevanceJudgeConfig,
}

impl HttpRelevanceJudge {
    pub fn new(config: HttpRelevanceJudgeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> SearchResult<Self> {
        Ok(Self::new(HttpRelevanceJudgeConfig::from_env()?))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

/// Some models wrap the array in an object (e.g. `{"decisions": [...]}`)
/// when `response_format` only guarantees "valid JSON", not "a JSON array at
/// the top level". Either shape is accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JudgeReply {
    Array(Vec<RelevanceDecision>),
    Wrapped { decisions: Vec<RelevanceDecision> },
}

impl From<JudgeReply> for Vec<RelevanceDecision> {
    fn from(reply: JudgeReply) -> Self {
        match reply {
            JudgeReply::Array(decisions) => decisions,
            JudgeReply::Wrapped { decisions } => decisions,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a relevance filter for a document search \
system. Given a question and a list of candidate passages, decide for each \
candidate whether it helps answer the question. Respond with a JSON array \
with exactly one element per candidate, in any order, each of the shape \
{\"node_id\": string, \"keep\": boolean, \"reason\": string}. Every node_id \
you were given must appear exactly once. \"reason\" must be a non-empty, \
one-sentence justification.";

#[async_trait]
impl RelevanceJudge for HttpRelevanceJudge {
    async fn judge(
        &self,
        question: &str,
        candidates: &[RelevanceCandidateInput],
    ) -> SearchResult<Vec<RelevanceDecision>> {
        let user_content = serde_json::to_string(&serde_json::json!({
            "question": question,
            "candidates": candidates,
        }))
        .map_err(|e| SearchError::Pipeline(format!("failed to marshal candidates: {e}")))?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Pipeline(format!("relevance judge request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Pipeline(format!(
                "relevance judge returned {status}: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Pipeline(format!("malformed chat completion envelope: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Pipeline("relevance judge returned no choices".to_string()))?
            .message
            .content;

        let reply: JudgeReply = serde_json::from_str(&content).map_err(|e| {
            SearchError::Pipeline(format!(
                "relevance judge reply did not parse as a JSON array: {e}"
            ))
        })?;

        Ok(reply.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_reply_accepts_bare_array() {
        let raw = r#"[{"node_id":"a","keep":true,"reason":"on topic"}]"#;
        let reply: JudgeReply = serde_json::from_str(raw).unwrap();
        let decisions: Vec<RelevanceDecision> = reply.into();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].node_id, "a");
    }

    #[test]
    fn judge_reply_accepts_wrapped_object() {
        let raw = r#"{"decisions":[{"node_id":"a","keep":false,"reason":"off topic"}]}"#;
        let reply: JudgeReply = serde_json::from_str(raw).unwrap();
        let decisions: Vec<RelevanceDecision> = reply.into();
        assert_eq!(decisions.len(), 1);
        assert!(!decisions[0].keep);
    }
}
