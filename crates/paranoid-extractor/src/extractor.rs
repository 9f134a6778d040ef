//! Language extractor trait and the per-extension dispatch table.

use crate::languages::{c, generic, go, java, javascript, python, rust, typescript};
use crate::parser_pool::ParserPool;
use paranoid_core::{Entity, Relationship};
use std::path::Path;

#[derive(Clone, Default)]
pub struct ExtractionResult {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult>;
}

/// Dispatch on the file's extension. Returns `None` for extensions with no
/// registered extractor (`UnsupportedLanguage` at the caller).
pub fn get_extractor(path: &Path, parser_pool: ParserPool) -> Option<Box<dyn LanguageExtractor>> {
    let ext = path.extension()?.to_str()?;
    let extractor: Box<dyn LanguageExtractor> = match ext {
        "py" => Box::new(python::PythonExtractor::new(parser_pool)),
        "js" | "jsx" | "mjs" | "cjs" => Box::new(javascript::JavaScriptExtractor::new(parser_pool)),
        "ts" | "tsx" => Box::new(typescript::TypeScriptExtractor::new(parser_pool)),
        "rs" => Box::new(rust::RustExtractor::new(parser_pool)),
        "go" => Box::new(go::GoExtractor::new(parser_pool)),
        "java" => Box::new(java::JavaExtractor::new(parser_pool)),
        "c" | "h" => Box::new(c::CExtractor::new(parser_pool)),
        _ => Box::new(generic::GenericExtractor::new(parser_pool)),
    };
    Some(extractor)
}
