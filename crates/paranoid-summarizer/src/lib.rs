//! The Summarizer (§4.E): bottom-up directory summarization with smart
//! invalidation, prompt templates, and per-item error recording.

pub mod context;
pub mod summarizer;
pub mod templates;

pub use summarizer::{SummarizeOutcome, SummarizeTreeSummary, Summarizer};
pub use templates::TemplateRegistry;
