//! Per-reranker configuration.

use serde::{Deserialize, Serialize};

/// The reranking strategy a config instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankerType {
    /// LLM-judge reordering.
    Llm,
    /// Cross-encoder (or embedding-cosine fallback) scoring.
    Semantic,
    /// Domain heuristic for API documentation.
    ApiDocs,
}

/// Prompt template used by the LLM reranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    /// General relevance ranking.
    #[default]
    Default,
    /// Ranking tuned for API reference material.
    ApiDocumentation,
    /// Ranking tuned for troubleshooting content.
    TechnicalSupport,
}

/// Settings for one reranker instance.
///
/// `name` is the registry key; several instances of the same type may be
/// registered under different names (e.g. two LLM rerankers with different
/// prompt templates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Unique registry key.
    pub name: String,
    /// Strategy to instantiate.
    pub reranker_type: RerankerType,
    /// Disabled rerankers are skipped by pipelines without logging noise.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Candidates the stage actively reranks (LLM prompt size). Candidates
    /// beyond this keep their relative order after the reranked head.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Results scoring below this after the stage are dropped. Zero keeps
    /// everything.
    #[serde(default)]
    pub threshold: f32,
    /// TTL for the per-stage cache, in seconds. Zero disables caching.
    #[serde(default)]
    pub cache_ttl_secs: u64,
    /// Document content is truncated to this many characters before being
    /// scored by a model or listed in a prompt.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Model identifier (cross-encoder model id or LLM model name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Prompt template for LLM rerankers.
    #[serde(default)]
    pub prompt_template: PromptTemplate,
    /// Weight of regex pattern signals in the API-docs heuristic.
    #[serde(default = "default_pattern_weight")]
    pub pattern_weight: f32,
    /// Weight of technical-depth signals in the API-docs heuristic.
    #[serde(default = "default_depth_weight")]
    pub depth_weight: f32,
    /// Weight of metadata/intent alignment in the API-docs heuristic.
    #[serde(default = "default_metadata_weight")]
    pub metadata_weight: f32,
    /// Weight of content-length alignment in the API-docs heuristic.
    #[serde(default = "default_length_weight")]
    pub length_weight: f32,
}

fn default_enabled() -> bool {
    true
}

fn default_top_k() -> usize {
    10
}

fn default_max_content_chars() -> usize {
    1200
}

fn default_pattern_weight() -> f32 {
    0.40
}

fn default_depth_weight() -> f32 {
    0.25
}

fn default_metadata_weight() -> f32 {
    0.20
}

fn default_length_weight() -> f32 {
    0.15
}

impl RerankerConfig {
    /// Create a config with defaults for the given name and type.
    pub fn new(name: impl Into<String>, reranker_type: RerankerType) -> Self {
        Self {
            name: name.into(),
            reranker_type,
            enabled: default_enabled(),
            top_k: default_top_k(),
            threshold: 0.0,
            cache_ttl_secs: 0,
            max_content_chars: default_max_content_chars(),
            model: None,
            prompt_template: PromptTemplate::default(),
            pattern_weight: default_pattern_weight(),
            depth_weight: default_depth_weight(),
            metadata_weight: default_metadata_weight(),
            length_weight: default_length_weight(),
        }
    }

    /// Set the prompt template.
    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = template;
        self
    }

    /// Set the cache TTL in seconds.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set the score threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}
