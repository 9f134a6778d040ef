//! JavaScript extractor: functions, classes, methods, imports, calls.
//!
//! The walk is shared with [`super::typescript`] via [`walk_js_family`] —
//! the two grammars agree on the node kinds this extractor cares about.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use paranoid_core::{Entity, EntityId, EntityKind, Relationship, RelationshipId, RelationshipKind};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Point};

pub struct JavaScriptExtractor {
    parser_pool: ParserPool,
}

impl JavaScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

pub(crate) fn line(point: Point) -> u32 {
    point.row as u32 + 1
}

pub(crate) struct Ctx<'a> {
    pub path: &'a Path,
    pub source: &'a [u8],
    pub language: &'static str,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub rel_seq: u64,
}

impl Ctx<'_> {
    fn push_rel(&mut self, from_entity: Option<EntityId>, to_file: Option<String>, kind: RelationshipKind, line: u32) {
        self.rel_seq += 1;
        self.relationships.push(Relationship {
            id: RelationshipId(self.rel_seq),
            from_entity,
            to_entity: None,
            from_file: self.path.to_path_buf(),
            to_file,
            kind,
            location: format!("{}:{}", self.path.display(), line),
        });
    }
}

fn identifier_name(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == "identifier" || c.kind() == "property_identifier" || c.kind() == "type_identifier")
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_string)
}

fn leading_comment(node: Node, source: &[u8]) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() == "comment" {
        prev.utf8_text(source).ok().map(|s| s.trim_start_matches("//").trim_start_matches("/**").trim_end_matches("*/").trim().to_string())
    } else {
        None
    }
}

fn signature_of(node: Node, source: &[u8]) -> Option<String> {
    let params = node.child_by_field_name("parameters")?;
    params.utf8_text(source).ok().map(str::to_string)
}

pub(crate) fn walk_js_family(
    node: Node,
    ctx: &mut Ctx,
    enclosing_qname: Option<&str>,
    enclosing_id: Option<EntityId>,
    in_class: bool,
) {
    match node.kind() {
        "class_declaration" => {
            if let Some(name) = identifier_name(node, ctx.source) {
                let qualified_name = match enclosing_qname {
                    Some(q) => format!("{q}.{name}"),
                    None => name.clone(),
                };
                let id = EntityId::derive(ctx.path, &qualified_name);
                ctx.entities.push(Entity {
                    id,
                    file_path: ctx.path.to_path_buf(),
                    kind: EntityKind::Class,
                    name,
                    qualified_name: qualified_name.clone(),
                    parent_entity: enclosing_id,
                    start_line: line(node.start_position()),
                    end_line: line(node.end_position()),
                    docstring: leading_comment(node, ctx.source),
                    signature: None,
                    language: ctx.language.to_string(),
                });

                if let Some(heritage) = node.child_by_field_name("superclass") {
                    if let Ok(base) = heritage.utf8_text(ctx.source) {
                        ctx.push_rel(Some(id), Some(base.to_string()), RelationshipKind::Inherits, line(heritage.start_position()));
                    }
                }

                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        walk_js_family(child, ctx, Some(&qualified_name), Some(id), true);
                    }
                }
                return;
            }
        }
        "function_declaration" | "method_definition" => {
            if let Some(name) = identifier_name(node, ctx.source) {
                let qualified_name = match enclosing_qname {
                    Some(q) => format!("{q}.{name}"),
                    None => name.clone(),
                };
                let id = EntityId::derive(ctx.path, &qualified_name);
                ctx.entities.push(Entity {
                    id,
                    file_path: ctx.path.to_path_buf(),
                    kind: if in_class { EntityKind::Method } else { EntityKind::Function },
                    name,
                    qualified_name: qualified_name.clone(),
                    parent_entity: if in_class { enclosing_id } else { None },
                    start_line: line(node.start_position()),
                    end_line: line(node.end_position()),
                    docstring: leading_comment(node, ctx.source),
                    signature: signature_of(node, ctx.source),
                    language: ctx.language.to_string(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    extract_calls(body, ctx, id);
                }
                return;
            }
        }
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "string" {
                    if let Ok(module) = child.utf8_text(ctx.source) {
                        let module = module.trim_matches(['"', '\'']).to_string();
                        ctx.push_rel(None, Some(module), RelationshipKind::Imports, line(node.start_position()));
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_js_family(child, ctx, enclosing_qname, enclosing_id, in_class);
    }
}

fn extract_calls(node: Node, ctx: &mut Ctx, enclosing: EntityId) {
    if matches!(node.kind(), "function_declaration" | "method_definition" | "arrow_function" | "function_expression") {
        return;
    }
    if node.kind() == "call_expression" || node.kind() == "new_expression" {
        if let Some(func) = node.child_by_field_name("function").or_else(|| node.child_by_field_name("constructor")) {
            if let Ok(callee) = func.utf8_text(ctx.source) {
                let kind = if node.kind() == "new_expression" { RelationshipKind::Instantiates } else { RelationshipKind::Calls };
                ctx.push_rel(Some(enclosing), Some(callee.to_string()), kind, line(node.start_position()));
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_calls(child, ctx, enclosing);
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest { file_type: FileType::JavaScript, content: source_code.to_string(), path: PathBuf::from(path) };
        let parse_result = self.parser_pool.parse_blocking(request)?;

        let mut ctx = Ctx { path, source: content, language: "javascript", entities: Vec::new(), relationships: Vec::new(), rel_seq: 0 };
        walk_js_family(parse_result.tree.root_node(), &mut ctx, None, None, false);

        Ok(ExtractionResult { entities: ctx.entities, relationships: ctx.relationships })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_class_method_and_instantiation() {
        let pool = crate::parser_pool::create_parser_pool();
        let extractor = JavaScriptExtractor::new(pool);
        let code = r#"
class User {
    constructor(name) {
        this.name = name;
    }
    getName() {
        return this.name;
    }
}

function createUser(name) {
    return new User(name);
}
"#;
        let result = extractor.extract(Path::new("a.js"), code.as_bytes()).unwrap();
        let names: Vec<_> = result.entities.iter().map(|e| e.qualified_name.as_str()).collect();
        assert!(names.contains(&"User"));
        assert!(names.contains(&"User.getName"));
        assert!(names.contains(&"createUser"));
        assert!(result.relationships.iter().any(|r| r.kind == RelationshipKind::Instantiates));
    }
}
