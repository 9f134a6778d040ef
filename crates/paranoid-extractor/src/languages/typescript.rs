//! TypeScript extractor. Reuses the JavaScript-family walk — the grammars
//! agree on the node kinds this extractor inspects (type annotations on
//! parameters/returns are part of the `parameters` slice already captured
//! as `signature`, so no separate handling is needed).

use super::javascript::{walk_js_family, Ctx};
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use std::path::{Path, PathBuf};

pub struct TypeScriptExtractor {
    parser_pool: ParserPool,
}

impl TypeScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::TypeScript, content: source_code.to_string(), path: PathBuf::from(path) };
        let parse_result = self.parser_pool.parse_blocking(request)?;

        let mut ctx = Ctx { path, source: content, language: "typescript", entities: Vec::new(), relationships: Vec::new(), rel_seq: 0 };
        walk_js_family(parse_result.tree.root_node(), &mut ctx, None, None, false);

        Ok(ExtractionResult { entities: ctx.entities, relationships: ctx.relationships })
    }
}
