//! Model host backends.

pub mod local;

pub use local::OllamaModelHost;
