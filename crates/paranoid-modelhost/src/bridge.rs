//! `ModelHost` — the three-operation contract (§6) against a single local
//! HTTP endpoint. Summarizer, Indexer, and Query router all talk to the
//! model host only through this trait.

use async_trait::async_trait;
use paranoid_core::CoreResult;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 512 }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub text: String,
    pub tokens_used: u32,
    pub model_version: Option<String>,
    pub elapsed_ms: u64,
}

#[async_trait]
pub trait ModelHost: Send + Sync {
    /// Full generation call, used by the Summarizer and the Query router's
    /// answer synthesis.
    async fn generate(&self, model: &str, prompt: &str, options: GenerateOptions) -> CoreResult<GenerateResult>;

    /// Short, temperature-0, low-predict-cap call used for question
    /// classification.
    async fn generate_simple(&self, model: &str, prompt: &str) -> CoreResult<String>;

    /// Fixed-dimension embedding for Indexer writes and query-time lookup.
    async fn embed(&self, model: &str, text: &str) -> CoreResult<Vec<f32>>;
}
