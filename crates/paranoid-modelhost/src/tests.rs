//! `OllamaModelHost` tests against an unreachable endpoint — no real model
//! host is available in this environment, so only the failure path (the
//! one behavior independent of a running Ollama instance) is exercised.

use crate::bridge::{GenerateOptions, ModelHost};
use crate::providers::OllamaModelHost;
use paranoid_core::CoreError;
use std::time::Duration;

#[tokio::test]
async fn generate_against_unreachable_host_surfaces_model_host_unreachable() {
    let host = OllamaModelHost::new("http://127.0.0.1:1", Duration::from_millis(200));
    let err = host.generate("llama3", "hello", GenerateOptions::default()).await.unwrap_err();
    assert!(matches!(err, CoreError::ModelHostUnreachable { .. }));
}

#[tokio::test]
async fn embed_against_unreachable_host_surfaces_model_host_unreachable() {
    let host = OllamaModelHost::new("http://127.0.0.1:1", Duration::from_millis(200));
    let err = host.embed("nomic-embed-text", "hello").await.unwrap_err();
    assert!(matches!(err, CoreError::ModelHostUnreachable { .. }));
}

#[tokio::test]
async fn generate_simple_against_unreachable_host_surfaces_model_host_unreachable() {
    let host = OllamaModelHost::new("http://127.0.0.1:1", Duration::from_millis(200));
    let err = host.generate_simple("llama3", "classify: ...").await.unwrap_err();
    assert!(matches!(err, CoreError::ModelHostUnreachable { .. }));
}
