//! Graph extractor (component D): per-language parsing into Entities and
//! Relationships, the incremental skip rule, and the resolution pass.

pub mod coordinator;
pub mod extractor;
pub mod languages;
pub mod parser_pool;
pub mod resolve;

#[cfg(test)]
mod tests;

pub use coordinator::{AnalyzeOutcome, AnalyzeTreeSummary, Coordinator};
pub use extractor::{get_extractor, ExtractionResult, LanguageExtractor};
pub use parser_pool::{create_parser_pool, FileType, ParserPool};
