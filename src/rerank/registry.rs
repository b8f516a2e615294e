//! Reranker registry, factory, and pipeline execution.
//!
//! The registry is an explicit object owned by one orchestrator instance;
//! there is no process-global state. Rerankers are built by type from a
//! [`RerankerConfig`], registered under the config name, and grouped into
//! named pipelines (ordered lists of reranker names).

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SagittaError};
use crate::llm::LlmClient;
use crate::rerank::api_docs::ApiDocsReranker;
use crate::rerank::config::{PromptTemplate, RerankerConfig, RerankerType};
use crate::rerank::llm::LlmReranker;
use crate::rerank::semantic::{CrossEncoder, SemanticReranker};
use crate::rerank::{RerankContext, Reranker};

/// External collaborators rerankers are built against.
#[derive(Clone)]
pub struct RerankerDeps {
    /// Embedding provider, used by the semantic fallback path.
    pub embedding: EmbeddingProvider,
    /// LLM client for LLM-judge rerankers. Absent means those stages fail
    /// (and are skipped by pipelines).
    pub llm: Option<Arc<dyn LlmClient>>,
    /// Cross-encoder for the semantic reranker's preferred path.
    pub cross_encoder: Option<Arc<dyn CrossEncoder>>,
}

/// Registry of reranker instances and named pipelines.
pub struct RerankerRegistry {
    rerankers: AHashMap<String, Arc<dyn Reranker>>,
    enabled: AHashMap<String, bool>,
    pipelines: AHashMap<String, Vec<String>>,
}

impl RerankerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rerankers: AHashMap::new(),
            enabled: AHashMap::new(),
            pipelines: AHashMap::new(),
        }
    }

    /// Build a reranker instance from its config.
    pub fn build(config: RerankerConfig, deps: &RerankerDeps) -> Arc<dyn Reranker> {
        match config.reranker_type {
            RerankerType::Semantic => Arc::new(SemanticReranker::new(
                config,
                deps.cross_encoder.clone(),
                deps.embedding.clone(),
            )),
            RerankerType::Llm => Arc::new(LlmReranker::new(config, deps.llm.clone())),
            RerankerType::ApiDocs => Arc::new(ApiDocsReranker::new(config)),
        }
    }

    /// Build and register a reranker under its config name.
    ///
    /// Registering a duplicate name is a configuration error.
    pub fn register(&mut self, config: RerankerConfig, deps: &RerankerDeps) -> Result<()> {
        if self.rerankers.contains_key(&config.name) {
            return Err(SagittaError::config(format!(
                "reranker '{}' is already registered",
                config.name
            )));
        }
        let name = config.name.clone();
        let enabled = config.enabled;
        let reranker = Self::build(config, deps);
        self.rerankers.insert(name.clone(), reranker);
        self.enabled.insert(name, enabled);
        Ok(())
    }

    /// Define a named pipeline over already-registered rerankers.
    ///
    /// Referencing an unregistered name is a configuration error.
    pub fn register_pipeline(
        &mut self,
        name: impl Into<String>,
        stages: Vec<String>,
    ) -> Result<()> {
        for stage in &stages {
            if !self.rerankers.contains_key(stage) {
                return Err(SagittaError::config(format!(
                    "pipeline stage '{stage}' is not a registered reranker"
                )));
            }
        }
        self.pipelines.insert(name.into(), stages);
        Ok(())
    }

    /// Look up a reranker by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Reranker>> {
        self.rerankers.get(name).cloned()
    }

    /// The stage names of a pipeline, if defined.
    pub fn pipeline(&self, name: &str) -> Option<&[String]> {
        self.pipelines.get(name).map(Vec::as_slice)
    }

    /// Names of all defined pipelines.
    pub fn pipeline_names(&self) -> Vec<&str> {
        self.pipelines.keys().map(String::as_str).collect()
    }

    /// Run a named pipeline over a candidate set.
    ///
    /// Stages execute strictly in sequence, each bounded by `stage_timeout`.
    /// A stage that errors, times out, or is disabled leaves the previous
    /// ordering in place; the pipeline itself never fails once resolved.
    /// An unknown pipeline name is a configuration error.
    pub async fn run_pipeline(
        &self,
        pipeline_name: &str,
        query: &str,
        results: Vec<SearchResult>,
        context: &RerankContext,
        stage_timeout: Duration,
    ) -> Result<Vec<SearchResult>> {
        let stages = self.pipeline(pipeline_name).ok_or_else(|| {
            SagittaError::config(format!("unknown reranker pipeline '{pipeline_name}'"))
        })?;

        let mut current = results;
        for stage_name in stages {
            if !self.enabled.get(stage_name).copied().unwrap_or(false) {
                debug!(stage = %stage_name, "reranker disabled, skipping");
                continue;
            }
            // Registration validated the name; a miss here means the
            // registry was mutated since, treat as a skipped stage.
            let Some(reranker) = self.get(stage_name) else {
                warn!(stage = %stage_name, "pipeline references missing reranker, skipping");
                continue;
            };

            // Each stage produces a new ordering, so abandoning a stage
            // leaves `current` untouched.
            let staged = current.clone();
            match tokio::time::timeout(stage_timeout, reranker.rerank(query, staged, context)).await
            {
                Ok(Ok(reranked)) => {
                    debug!(stage = %stage_name, count = reranked.len(), "rerank stage applied");
                    current = reranked;
                }
                Ok(Err(e)) => {
                    warn!(stage = %stage_name, query, error = %e, "rerank stage failed, keeping previous ordering");
                }
                Err(_) => {
                    warn!(
                        stage = %stage_name,
                        query,
                        timeout_ms = stage_timeout.as_millis() as u64,
                        "rerank stage timed out, keeping previous ordering"
                    );
                }
            }
        }
        Ok(current)
    }

    /// Registry pre-populated with the standard reranker set and pipelines.
    ///
    /// Rerankers: `semantic`, `llm`, `llm_api`, `llm_technical`, `api_docs`.
    /// Pipelines: `default`, `api_docs`, `technical`, and one single-stage
    /// pipeline per reranker type.
    pub fn with_default_pipelines(deps: &RerankerDeps) -> Result<Self> {
        let mut registry = Self::new();

        registry.register(
            RerankerConfig::new("semantic", RerankerType::Semantic),
            deps,
        )?;
        registry.register(RerankerConfig::new("llm", RerankerType::Llm), deps)?;
        registry.register(
            RerankerConfig::new("llm_api", RerankerType::Llm)
                .with_prompt_template(PromptTemplate::ApiDocumentation),
            deps,
        )?;
        registry.register(
            RerankerConfig::new("llm_technical", RerankerType::Llm)
                .with_prompt_template(PromptTemplate::TechnicalSupport),
            deps,
        )?;
        registry.register(
            RerankerConfig::new("api_docs", RerankerType::ApiDocs),
            deps,
        )?;

        registry.register_pipeline(
            "default",
            vec!["semantic".to_string(), "llm".to_string()],
        )?;
        registry.register_pipeline(
            "api_docs",
            vec!["api_docs".to_string(), "llm_api".to_string()],
        )?;
        registry.register_pipeline(
            "technical",
            vec!["llm_technical".to_string(), "semantic".to_string()],
        )?;
        registry.register_pipeline("semantic_only", vec!["semantic".to_string()])?;
        registry.register_pipeline("llm_only", vec!["llm".to_string()])?;
        registry.register_pipeline("api_docs_only", vec!["api_docs".to_string()])?;

        Ok(registry)
    }
}

impl Default for RerankerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::embedding::HashingEmbedder;
    use async_trait::async_trait;

    fn deps() -> RerankerDeps {
        RerankerDeps {
            embedding: EmbeddingProvider::Query(Arc::new(HashingEmbedder::new(32).unwrap())),
            llm: None,
            cross_encoder: None,
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

    struct ReversingReranker;

    #[async_trait]
    impl Reranker for ReversingReranker {
        fn name(&self) -> &str {
            "reversing"
        }

        async fn rerank(
            &self,
            _query: &str,
            mut results: Vec<SearchResult>,
            _context: &RerankContext,
        ) -> Result<Vec<SearchResult>> {
            results.reverse();
            Ok(results)
        }
    }

    struct ExplodingReranker;

    #[async_trait]
    impl Reranker for ExplodingReranker {
        fn name(&self) -> &str {
            "exploding"
        }

        async fn rerank(
            &self,
            _query: &str,
            _results: Vec<SearchResult>,
            _context: &RerankContext,
        ) -> Result<Vec<SearchResult>> {
            Err(SagittaError::rerank("boom"))
        }
    }

    fn registry_with(rerankers: Vec<Arc<dyn Reranker>>) -> RerankerRegistry {
        let mut registry = RerankerRegistry::new();
        for reranker in rerankers {
            let name = reranker.name().to_string();
            registry.rerankers.insert(name.clone(), reranker);
            registry.enabled.insert(name, true);
        }
        registry
    }

    #[test]
    fn test_default_set() {
        let registry = RerankerRegistry::with_default_pipelines(&deps()).unwrap();
        assert!(registry.get("semantic").is_some());
        assert!(registry.get("api_docs").is_some());
        assert_eq!(
            registry.pipeline("default").unwrap(),
            &["semantic".to_string(), "llm".to_string()]
        );
        assert!(registry.pipeline("technical").is_some());
        assert!(registry.pipeline("nonexistent").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails_fast() {
        let mut registry = RerankerRegistry::new();
        let config = RerankerConfig::new("semantic", RerankerType::Semantic);
        registry.register(config.clone(), &deps()).unwrap();
        let err = registry.register(config, &deps()).unwrap_err();
        assert!(matches!(err, SagittaError::Config(_)));
    }

    #[test]
    fn test_pipeline_with_unknown_stage_fails_fast() {
        let mut registry = RerankerRegistry::new();
        let err = registry
            .register_pipeline("broken", vec!["ghost".to_string()])
            .unwrap_err();
        assert!(matches!(err, SagittaError::Config(_)));
    }

    #[tokio::test]
    async fn test_unknown_pipeline_is_config_error() {
        let registry = RerankerRegistry::new();
        let err = registry
            .run_pipeline(
                "ghost",
                "q",
                candidates(&["a"]),
                &RerankContext::for_query("q"),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::Config(_)));
    }

    #[tokio::test]
    async fn test_failing_stage_keeps_previous_ordering() {
        let mut registry = registry_with(vec![
            Arc::new(ReversingReranker),
            Arc::new(ExplodingReranker),
        ]);
        registry
            .register_pipeline(
                "p",
                vec!["reversing".to_string(), "exploding".to_string()],
            )
            .unwrap();

        let out = registry
            .run_pipeline(
                "p",
                "q",
                candidates(&["a", "b", "c"]),
                &RerankContext::for_query("q"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        // Reversed by stage one; stage two failed and changed nothing.
        let ids: Vec<&str> = out.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_failing_stage_does_not_abort_later_stages() {
        let mut registry = registry_with(vec![
            Arc::new(ExplodingReranker),
            Arc::new(ReversingReranker),
        ]);
        registry
            .register_pipeline(
                "p",
                vec!["exploding".to_string(), "reversing".to_string()],
            )
            .unwrap();

        let out = registry
            .run_pipeline(
                "p",
                "q",
                candidates(&["a", "b"]),
                &RerankContext::for_query("q"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        let ids: Vec<&str> = out.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_disabled_stage_is_skipped() {
        let mut registry = registry_with(vec![Arc::new(ReversingReranker)]);
        registry.enabled.insert("reversing".to_string(), false);
        registry
            .register_pipeline("p", vec!["reversing".to_string()])
            .unwrap();

        let out = registry
            .run_pipeline(
                "p",
                "q",
                candidates(&["a", "b"]),
                &RerankContext::for_query("q"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = out.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_slow_stage_times_out() {
        struct SlowReranker;

        #[async_trait]
        impl Reranker for SlowReranker {
            fn name(&self) -> &str {
                "slow"
            }

            async fn rerank(
                &self,
                _query: &str,
                results: Vec<SearchResult>,
                _context: &RerankContext,
            ) -> Result<Vec<SearchResult>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(results)
            }
        }

        let mut registry = registry_with(vec![Arc::new(SlowReranker)]);
        registry
            .register_pipeline("p", vec!["slow".to_string()])
            .unwrap();

        let out = registry
            .run_pipeline(
                "p",
                "q",
                candidates(&["a"]),
                &RerankContext::for_query("q"),
                Duration::from_millis(10),
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
    }
}
