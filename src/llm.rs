//! LLM generation contract.
//!
//! The surrounding application owns the actual provider (OpenAI, Anthropic,
//! a local model, ...). This crate only consumes the `generate` call, from
//! the LLM reranker. Errors from `generate` are stage failures, never
//! pipeline failures.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, max_tokens: usize, temperature: f32) -> Result<String>;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "llm"
    }
}
