//! LLM-judge reranker.
//!
//! Builds a prompt listing the candidate documents by id, asks the model to
//! return a JSON array of ids in relevance order, and reorders accordingly.
//! Truncated, malformed, or hallucinated output is a stage failure: the
//! pipeline keeps the pre-stage ordering and moves on.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::{Result, SagittaError};
use crate::llm::LlmClient;
use crate::rerank::cache::RerankCache;
use crate::rerank::config::{PromptTemplate, RerankerConfig};
use crate::rerank::{RerankContext, Reranker};

const GENERATION_MAX_TOKENS: usize = 512;
const GENERATION_TEMPERATURE: f32 = 0.0;

/// Reranker that delegates ordering judgment to an LLM.
pub struct LlmReranker {
    config: RerankerConfig,
    client: Option<Arc<dyn LlmClient>>,
    cache: Option<RerankCache>,
}

impl LlmReranker {
    /// Create an LLM reranker. A missing client makes every invocation a
    /// stage failure, which pipelines already tolerate.
    pub fn new(config: RerankerConfig, client: Option<Arc<dyn LlmClient>>) -> Self {
        let cache = (config.cache_ttl_secs > 0)
            .then(|| RerankCache::new(Duration::from_secs(config.cache_ttl_secs)));
        Self {
            config,
            client,
            cache,
        }
    }

    fn build_prompt(&self, query: &str, head: &[SearchResult]) -> String {
        let mut listing = String::new();
        for result in head {
            let snippet: String = result
                .document
                .content
                .chars()
                .take(self.config.max_content_chars)
                .collect();
            listing.push_str(&format!("[{}] {}\n\n", result.document.id, snippet));
        }

        let instructions = match self.config.prompt_template {
            PromptTemplate::Default => {
                "Rank the documents below by relevance to the query.".to_string()
            }
            PromptTemplate::ApiDocumentation => "Rank the API documentation excerpts below by how \
                 well they answer the query. Prefer excerpts that name the exact endpoint, method, \
                 parameters, or response fields the query asks about."
                .to_string(),
            PromptTemplate::TechnicalSupport => "Rank the documents below by how well they help \
                 resolve the technical problem in the query. Prefer documents describing causes, \
                 error conditions, and concrete fixes."
                .to_string(),
        };

        format!(
            "{instructions}\n\nQuery: {query}\n\nDocuments:\n{listing}Respond with a JSON array \
             of exactly {count} document ids, most relevant first, and nothing else.",
            count = head.len(),
        )
    }

    /// Extract the first JSON array of strings from the model output.
    ///
    /// Models frequently wrap the array in code fences or prose; anything
    /// beyond that tolerance is malformed output.
    fn parse_id_array(response: &str) -> Result<Vec<String>> {
        let start = response
            .find('[')
            .ok_or_else(|| SagittaError::malformed("no JSON array in LLM response"))?;
        let end = response[start..]
            .find(']')
            .map(|offset| start + offset + 1)
            .ok_or_else(|| SagittaError::malformed("unterminated JSON array in LLM response"))?;

        let parsed: Value = serde_json::from_str(&response[start..end])
            .map_err(|e| SagittaError::malformed(format!("invalid JSON array: {e}")))?;
        let ids = parsed
            .as_array()
            .ok_or_else(|| SagittaError::malformed("LLM response is not an array"))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SagittaError::malformed("array element is not a string"))
            })
            .collect::<Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn reorder(&self, results: Vec<SearchResult>, ids: &[String]) -> Result<Vec<SearchResult>> {
        let head_len = results.len().min(self.config.top_k);

        if ids.len() != head_len {
            return Err(SagittaError::malformed(format!(
                "expected {head_len} ids, LLM returned {}",
                ids.len()
            )));
        }

        let mut remaining: Vec<SearchResult> = results;
        let mut reordered: Vec<SearchResult> = Vec::with_capacity(remaining.len());

        for id in ids {
            let position = remaining
                .iter()
                .position(|r| &r.document.id == id)
                .ok_or_else(|| {
                    SagittaError::malformed(format!("LLM returned unknown document id '{id}'"))
                })?;
            reordered.push(remaining.remove(position));
        }
        // Candidates beyond the prompt head keep their relative order.
        reordered.append(&mut remaining);

        let total = reordered.len() as f32;
        for (position, result) in reordered.iter_mut().enumerate() {
            result.annotate("original_score", result.score as f64);
            result.annotate("rerank_stage", self.config.name.clone());
            result.annotate("llm_rank", position as u64);
            result.score = (total - position as f32) / total;
        }
        Ok(reordered)
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        _context: &RerankContext,
    ) -> Result<Vec<SearchResult>> {
        if results.is_empty() {
            return Ok(results);
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| SagittaError::rerank("no LLM client configured"))?;

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(query, &results)
        {
            debug!(stage = self.name(), "rerank cache hit");
            return Ok(hit);
        }

        let input = results.clone();
        let head_len = results.len().min(self.config.top_k);
        let prompt = self.build_prompt(query, &results[..head_len]);

        let response = client
            .generate(&prompt, GENERATION_MAX_TOKENS, GENERATION_TEMPERATURE)
            .await?;
        let ids = Self::parse_id_array(&response)?;
        let reordered = self.reorder(results, &ids)?;

        if let Some(cache) = &self.cache {
            cache.put(query, &input, reordered.clone());
        }
        Ok(reordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::rerank::config::RerankerType;

    struct ScriptedLlm {
        response: String,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(
            &self,
            _prompt: &str,
            _max_tokens: usize,
            _temperature: f32,
        ) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    fn candidates(ids: &[&str]) -> Vec<SearchResult> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                SearchResult::new(Document::new(*id, format!("doc {id}")), 5.0 - i as f32)
            })
            .collect()
    }

    fn reranker(response: &str) -> LlmReranker {
        LlmReranker::new(
            RerankerConfig::new("llm", RerankerType::Llm),
            Some(Arc::new(ScriptedLlm {
                response: response.to_string(),
            })),
        )
    }

    #[tokio::test]
    async fn test_reorders_by_llm_judgment() {
        let reranker = reranker(r#"["d3", "d1", "d2"]"#);
        let reranked = reranker
            .rerank("q", candidates(&["d1", "d2", "d3"]), &RerankContext::for_query("q"))
            .await
            .unwrap();

        let ids: Vec<&str> = reranked.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["d3", "d1", "d2"]);
        assert!(reranked[0].score > reranked[1].score);
    }

    #[tokio::test]
    async fn test_tolerates_code_fences() {
        let reranker = reranker("```json\n[\"d2\", \"d1\"]\n```");
        let reranked = reranker
            .rerank("q", candidates(&["d1", "d2"]), &RerankContext::for_query("q"))
            .await
            .unwrap();
        assert_eq!(reranked[0].document.id, "d2");
    }

    #[tokio::test]
    async fn test_malformed_output_is_stage_failure() {
        let reranker = reranker("I think d2 is the best document");
        let err = reranker
            .rerank("q", candidates(&["d1", "d2"]), &RerankContext::for_query("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_truncated_output_is_stage_failure() {
        let reranker = reranker(r#"["d1"]"#);
        let err = reranker
            .rerank("q", candidates(&["d1", "d2"]), &RerankContext::for_query("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_is_stage_failure() {
        let reranker = reranker(r#"["d1", "made_up"]"#);
        let err = reranker
            .rerank("q", candidates(&["d1", "d2"]), &RerankContext::for_query("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_client_is_stage_failure() {
        let reranker = LlmReranker::new(RerankerConfig::new("llm", RerankerType::Llm), None);
        let err = reranker
            .rerank("q", candidates(&["d1"]), &RerankContext::for_query("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::Rerank(_)));
    }

    #[tokio::test]
    async fn test_tail_beyond_top_k_keeps_order() {
        let mut config = RerankerConfig::new("llm", RerankerType::Llm);
        config.top_k = 2;
        let reranker = LlmReranker::new(
            config,
            Some(Arc::new(ScriptedLlm {
                response: r#"["d2", "d1"]"#.to_string(),
            })),
        );

        let reranked = reranker
            .rerank(
                "q",
                candidates(&["d1", "d2", "d3", "d4"]),
                &RerankContext::for_query("q"),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = reranked.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1", "d3", "d4"]);
    }

    #[test]
    fn test_prompt_mentions_count_and_query() {
        let reranker = reranker("[]");
        let prompt = reranker.build_prompt("how to paginate", &candidates(&["d1", "d2"]));
        assert!(prompt.contains("exactly 2 document ids"));
        assert!(prompt.contains("how to paginate"));
        assert!(prompt.contains("[d1]"));
    }
}
