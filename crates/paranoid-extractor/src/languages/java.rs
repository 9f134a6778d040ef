//! Java extractor stub — parses but does not yet extract entities.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct JavaExtractor {
    parser_pool: ParserPool,
}

impl JavaExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for JavaExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::Java, content: source_code.to_string(), path: PathBuf::from(path) };
        let _parse_result = self.parser_pool.parse_blocking(request)?;
        // TODO: walk class/method declarations once Java joins the supported-language set.
        Ok(ExtractionResult::default())
    }
}
