//! Model host bridge: the narrow `generate`/`generate_simple`/`embed`
//! contract (§6) and its Ollama-backed implementation.

pub mod bridge;
pub mod providers;

#[cfg(test)]
mod tests;

pub use bridge::{GenerateOptions, GenerateResult, ModelHost};
pub use providers::OllamaModelHost;
