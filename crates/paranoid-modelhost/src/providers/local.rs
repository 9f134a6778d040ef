//! The only model host backend: a locally reachable Ollama-compatible HTTP
//! endpoint. Cloud providers are excluded by the spec's non-goals.

use crate::bridge::{GenerateOptions, GenerateResult, ModelHost};
use async_trait::async_trait;
use paranoid_core::CoreError;
use paranoid_core::CoreResult;
use serde_json::json;
use std::time::{Duration, Instant};

pub struct OllamaModelHost {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaModelHost {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, base_url: base_url.into() }
    }

    fn unreachable(&self, message: impl ToString) -> CoreError {
        CoreError::ModelHostUnreachable { host: self.base_url.clone(), message: message.to_string() }
    }

    async fn post(&self, path: &str, body: serde_json::Value, model: &str) -> CoreResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                self.unreachable(e)
            } else {
                CoreError::ModelError { model: model.to_string(), message: e.to_string() }
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CoreError::ModelNotFound { model: model.to_string() });
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::ModelError { model: model.to_string(), message: format!("HTTP {status}: {body}") });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| CoreError::ModelError { model: model.to_string(), message: e.to_string() })
    }
}

#[async_trait]
impl ModelHost for OllamaModelHost {
    async fn generate(&self, model: &str, prompt: &str, options: GenerateOptions) -> CoreResult<GenerateResult> {
        let started = Instant::now();
        let body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": options.temperature,
                "num_predict": options.max_tokens,
            }
        });
        let value = self.post("/api/generate", body, model).await?;

        let text = value.get("response").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let tokens_used = value.get("eval_count").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let model_version = value.get("model").and_then(|v| v.as_str()).map(str::to_string);

        Ok(GenerateResult { text, tokens_used, model_version, elapsed_ms: started.elapsed().as_millis() as u64 })
    }

    async fn generate_simple(&self, model: &str, prompt: &str) -> CoreResult<String> {
        let body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0.0, "num_predict": 16 }
        });
        let value = self.post("/api/generate", body, model).await?;
        Ok(value.get("response").and_then(|v| v.as_str()).unwrap_or_default().trim().to_string())
    }

    async fn embed(&self, model: &str, text: &str) -> CoreResult<Vec<f32>> {
        let body = json!({ "model": model, "prompt": text });
        let value = self.post("/api/embeddings", body, model).await?;
        let embedding = value
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| CoreError::ModelError { model: model.to_string(), message: "response missing `embedding` array".to_string() })?;

        Ok(embedding.iter().filter_map(|v| v.as_f64()).map(|f| f as f32).collect())
    }
}
