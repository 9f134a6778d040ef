//! C extractor. Partial: free functions only; structs/enums/typedefs and
//! `#include` edges are not yet emitted as Entities/Relationships.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use paranoid_core::{Entity, EntityId, EntityKind};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Point};

pub struct CExtractor {
    parser_pool: ParserPool,
}

impl CExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        point.row as u32 + 1
    }

    fn extract_function(node: Node, source: &[u8], path: &Path) -> Option<Entity> {
        if node.kind() != "function_definition" {
            return None;
        }
        let declarator = node.child_by_field_name("declarator")?;
        let func_declarator = if declarator.kind() == "function_declarator" {
            declarator
        } else {
            let mut cursor = declarator.walk();
            declarator.children(&mut cursor).find(|c| c.kind() == "function_declarator")?
        };
        let name_node = func_declarator.child_by_field_name("declarator")?;
        let name = name_node.utf8_text(source).ok()?.to_string();

        Some(Entity {
            id: EntityId::derive(path, &name),
            file_path: path.to_path_buf(),
            kind: EntityKind::Function,
            qualified_name: name.clone(),
            name,
            parent_entity: None,
            start_line: Self::line(node.start_position()),
            end_line: Self::line(node.end_position()),
            docstring: None,
            signature: func_declarator.child_by_field_name("parameters").and_then(|p| p.utf8_text(source).ok()).map(str::to_string),
            language: "c".to_string(),
        })
    }
}

fn walk(node: Node, source: &[u8], path: &Path, entities: &mut Vec<Entity>) {
    if let Some(f) = CExtractor::extract_function(node, source, path) {
        entities.push(f);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, path, entities);
    }
}

impl LanguageExtractor for CExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::C, content: source_code.to_string(), path: PathBuf::from(path) };
        let parse_result = self.parser_pool.parse_blocking(request)?;

        let mut entities = Vec::new();
        walk(parse_result.tree.root_node(), content, path, &mut entities);

        Ok(ExtractionResult { entities, relationships: Vec::new() })
    }
}
