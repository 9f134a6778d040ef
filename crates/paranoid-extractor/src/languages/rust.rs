//! Rust extractor. Not one of the initial supported languages; parses but
//! does not yet walk the tree for entities.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use std::path::{Path, PathBuf};

pub struct RustExtractor {
    parser_pool: ParserPool,
}

impl RustExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for RustExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::Rust, content: source_code.to_string(), path: PathBuf::from(path) };
        let _parse_result = self.parser_pool.parse_blocking(request)?;
        // TODO: walk impl/fn items once Rust joins the supported-language set.
        Ok(ExtractionResult::default())
    }
}
