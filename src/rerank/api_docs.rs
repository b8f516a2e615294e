//! Heuristic reranker for API documentation.
//!
//! No model calls: scores technical relevance from regex pattern matches,
//! technical-depth indicators, metadata alignment with a lightweight
//! query-intent classifier, and content-length fit. The heuristic is blended
//! with the incoming score so earlier retrieval evidence is not discarded.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::document::{Document, SearchResult};
use crate::error::Result;
use crate::lexical::tokenizer::tokenize;
use crate::rerank::cache::RerankCache;
use crate::rerank::config::RerankerConfig;
use crate::rerank::{RerankContext, Reranker};

/// Weight of the heuristic in the final blend; the rest is incoming score.
const HEURISTIC_WEIGHT: f32 = 0.7;

static HTTP_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b").unwrap());
static URL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[a-zA-Z0-9_{}.-]+(?:/[a-zA-Z0-9_{}.-]+)*").unwrap());
static STATUS_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[1-5][0-9]{2}\b").unwrap());
static JSON_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[A-Za-z0-9_]+"\s*:"#).unwrap());
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```").unwrap());

static DEPTH_KEYWORDS: &[&str] = &[
    "authentication",
    "authorization",
    "token",
    "oauth",
    "api key",
    "pagination",
    "cursor",
    "rate limit",
    "header",
    "webhook",
    "curl",
    "sdk",
    "request body",
    "response body",
];

static TROUBLESHOOTING_KEYWORDS: &[&str] = &[
    "error", "fail", "failed", "fails", "issue", "debug", "troubleshoot", "broken", "fix",
    "not working", "why",
];

static IMPLEMENTATION_KEYWORDS: &[&str] = &[
    "how", "implement", "integrate", "example", "tutorial", "build", "setup", "use", "call",
];

/// Coarse buckets of what a query is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// "how do I call this": wants examples and guides.
    Implementation,
    /// General conceptual questions.
    Information,
    /// Debugging a failure.
    Troubleshooting,
    /// Asking about a specific endpoint or status code.
    EndpointSpecific,
}

impl QueryIntent {
    /// Classify a free-text query.
    pub fn classify(query: &str) -> Self {
        let lowered = query.to_lowercase();

        if HTTP_VERB.is_match(query)
            || URL_PATH.is_match(query)
            || lowered.contains("endpoint")
            || lowered.contains("route")
            || STATUS_CODE.is_match(query)
        {
            return QueryIntent::EndpointSpecific;
        }
        if TROUBLESHOOTING_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return QueryIntent::Troubleshooting;
        }
        if IMPLEMENTATION_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return QueryIntent::Implementation;
        }
        QueryIntent::Information
    }

    /// Document `type` metadata values this intent favors.
    fn preferred_types(self) -> &'static [&'static str] {
        match self {
            QueryIntent::Implementation => &["guide", "tutorial", "example"],
            QueryIntent::Information => &["overview", "concept", "guide"],
            QueryIntent::Troubleshooting => &["troubleshooting", "faq", "errors"],
            QueryIntent::EndpointSpecific => &["endpoint", "reference", "api_reference"],
        }
    }

    /// Content length, in characters, this intent is best served by.
    fn ideal_content_len(self) -> f32 {
        match self {
            QueryIntent::Implementation => 1200.0,
            QueryIntent::Information => 600.0,
            QueryIntent::Troubleshooting => 800.0,
            QueryIntent::EndpointSpecific => 400.0,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            QueryIntent::Implementation => "implementation",
            QueryIntent::Information => "information",
            QueryIntent::Troubleshooting => "troubleshooting",
            QueryIntent::EndpointSpecific => "endpoint_specific",
        }
    }
}

/// Pure-heuristic reranker for API documentation corpora.
pub struct ApiDocsReranker {
    config: RerankerConfig,
    cache: Option<RerankCache>,
}

impl ApiDocsReranker {
    /// Create an API-docs reranker.
    pub fn new(config: RerankerConfig) -> Self {
        let cache = (config.cache_ttl_secs > 0)
            .then(|| RerankCache::new(Duration::from_secs(config.cache_ttl_secs)));
        Self { config, cache }
    }

    /// Regex signal: how much API surface the content exposes.
    fn pattern_score(content: &str) -> f32 {
        let matches = HTTP_VERB.find_iter(content).count()
            + URL_PATH.find_iter(content).count()
            + STATUS_CODE.find_iter(content).count()
            + JSON_KEY.find_iter(content).count()
            + CODE_FENCE.find_iter(content).count();
        (matches as f32 / 6.0).min(1.0)
    }

    /// Depth signal: code blocks and operational vocabulary.
    fn depth_score(content: &str) -> f32 {
        let lowered = content.to_lowercase();
        let fences = CODE_FENCE.find_iter(content).count() / 2;
        let keywords = DEPTH_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .count();
        ((fences + keywords) as f32 / 4.0).min(1.0)
    }

    /// Alignment of document metadata with the classified intent.
    fn metadata_score(document: &Document, intent: QueryIntent, query_terms: &[String]) -> f32 {
        let type_score = document
            .metadata
            .get("type")
            .and_then(|v| v.as_str())
            .map(|doc_type| {
                if intent.preferred_types().contains(&doc_type) {
                    1.0
                } else {
                    0.3
                }
            })
            .unwrap_or(0.5);

        let topic_score = document
            .metadata
            .get("topic")
            .and_then(|v| v.as_str())
            .map(|topic| {
                let topic_terms = tokenize(topic, 1);
                let overlap = topic_terms
                    .iter()
                    .filter(|t| query_terms.contains(t))
                    .count();
                if topic_terms.is_empty() {
                    0.5
                } else {
                    (overlap as f32 / topic_terms.len() as f32).min(1.0)
                }
            })
            .unwrap_or(0.5);

        (type_score + topic_score) / 2.0
    }

    /// Fit between content length and what the intent calls for.
    fn length_score(content: &str, intent: QueryIntent) -> f32 {
        let ideal = intent.ideal_content_len();
        let len = content.chars().count() as f32;
        (1.0 - (len - ideal).abs() / ideal).max(0.0)
    }

    fn heuristic(&self, document: &Document, intent: QueryIntent, query_terms: &[String]) -> f32 {
        self.config.pattern_weight * Self::pattern_score(&document.content)
            + self.config.depth_weight * Self::depth_score(&document.content)
            + self.config.metadata_weight * Self::metadata_score(document, intent, query_terms)
            + self.config.length_weight * Self::length_score(&document.content, intent)
    }
}

#[async_trait]
impl Reranker for ApiDocsReranker {
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

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(query, &results)
        {
            debug!(stage = self.name(), "rerank cache hit");
            return Ok(hit);
        }

        let input = results.clone();
        let intent = QueryIntent::classify(query);
        let query_terms = tokenize(query, 1);

        let mut reranked = results;
        for result in &mut reranked {
            let heuristic = self.heuristic(&result.document, intent, &query_terms);
            result.annotate("original_score", result.score as f64);
            result.annotate("rerank_stage", self.config.name.clone());
            result.annotate("query_intent", intent.as_str());
            result.annotate("heuristic_score", heuristic as f64);
            result.score = HEURISTIC_WEIGHT * heuristic + (1.0 - HEURISTIC_WEIGHT) * result.score;
        }

        reranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if self.config.threshold > 0.0 {
            reranked.retain(|r| r.score >= self.config.threshold);
        }

        if let Some(cache) = &self.cache {
            cache.put(query, &input, reranked.clone());
        }
        Ok(reranked)
    }
}
