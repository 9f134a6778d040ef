//! Fallback extractor for extensions with no registered grammar. Confirms
//! the file parses as plain text and declines to extract symbols.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct GenericExtractor {
    parser_pool: ParserPool,
}

impl GenericExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for GenericExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::Generic, content: source_code.to_string(), path: PathBuf::from(path) };
        let _parse_result = self.parser_pool.parse_blocking(request)?;
        Ok(ExtractionResult::default())
    }
}
