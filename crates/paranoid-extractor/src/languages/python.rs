//! Python extractor: classes, functions, methods, imports, calls, inherits.

use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use paranoid_core::{Entity, EntityId, EntityKind, Relationship, RelationshipId, RelationshipKind};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Point};

pub struct PythonExtractor {
    parser_pool: ParserPool,
}

impl PythonExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        point.row as u32 + 1
    }

    fn docstring_of(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let first_stmt = body.children(&mut cursor).find(|c| c.kind() == "expression_statement")?;
        let string_node = first_stmt.child(0)?;
        if string_node.kind() != "string" {
            return None;
        }
        string_node.utf8_text(source).ok().map(|s| s.trim_matches(['"', '\'']).trim().to_string())
    }

    fn signature_of(node: Node, source: &[u8]) -> Option<String> {
        let params = node.child_by_field_name("parameters")?;
        params.utf8_text(source).ok().map(str::to_string)
    }
}

struct Ctx<'a> {
    path: &'a Path,
    source: &'a [u8],
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    rel_seq: u64,
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

fn walk(node: Node, ctx: &mut Ctx, enclosing_qname: Option<&str>, enclosing_id: Option<EntityId>, in_class: bool) {
    match node.kind() {
        "class_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(ctx.source) {
                    let qualified_name = match enclosing_qname {
                        Some(q) => format!("{q}.{name}"),
                        None => name.to_string(),
                    };
                    let id = EntityId::derive(ctx.path, &qualified_name);
                    ctx.entities.push(Entity {
                        id,
                        file_path: ctx.path.to_path_buf(),
                        kind: EntityKind::Class,
                        name: name.to_string(),
                        qualified_name: qualified_name.clone(),
                        parent_entity: enclosing_id,
                        start_line: PythonExtractor::line(node.start_position()),
                        end_line: PythonExtractor::line(node.end_position()),
                        docstring: PythonExtractor::docstring_of(node, ctx.source),
                        signature: None,
                        language: "python".to_string(),
                    });

                    if let Some(bases) = node.child_by_field_name("superclasses") {
                        let mut cursor = bases.walk();
                        for base in bases.children(&mut cursor) {
                            if base.kind() == "identifier" || base.kind() == "attribute" {
                                if let Ok(base_name) = base.utf8_text(ctx.source) {
                                    ctx.push_rel(
                                        Some(id),
                                        Some(base_name.to_string()),
                                        RelationshipKind::Inherits,
                                        PythonExtractor::line(base.start_position()),
                                    );
                                }
                            }
                        }
                    }

                    if let Some(body) = node.child_by_field_name("body") {
                        let mut cursor = body.walk();
                        for child in body.children(&mut cursor) {
                            walk(child, ctx, Some(&qualified_name), Some(id), true);
                        }
                    }
                    return;
                }
            }
        }
        "function_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(ctx.source) {
                    let qualified_name = match enclosing_qname {
                        Some(q) => format!("{q}.{name}"),
                        None => name.to_string(),
                    };
                    let id = EntityId::derive(ctx.path, &qualified_name);
                    ctx.entities.push(Entity {
                        id,
                        file_path: ctx.path.to_path_buf(),
                        kind: if in_class { EntityKind::Method } else { EntityKind::Function },
                        name: name.to_string(),
                        qualified_name: qualified_name.clone(),
                        parent_entity: if in_class { enclosing_id } else { None },
                        start_line: PythonExtractor::line(node.start_position()),
                        end_line: PythonExtractor::line(node.end_position()),
                        docstring: PythonExtractor::docstring_of(node, ctx.source),
                        signature: PythonExtractor::signature_of(node, ctx.source),
                        language: "python".to_string(),
                    });

                    if let Some(body) = node.child_by_field_name("body") {
                        extract_calls(body, ctx, id);
                        let mut cursor = body.walk();
                        for child in body.children(&mut cursor) {
                            walk(child, ctx, Some(&qualified_name), Some(id), false);
                        }
                    }
                    return;
                }
            }
        }
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "dotted_name" || child.kind() == "aliased_import" {
                    if let Ok(module) = child.utf8_text(ctx.source) {
                        let module = module.split_whitespace().next().unwrap_or(module).to_string();
                        ctx.push_rel(None, Some(module), RelationshipKind::Imports, PythonExtractor::line(node.start_position()));
                    }
                }
            }
        }
        "import_from_statement" => {
            if let Some(module_node) = node.child_by_field_name("module_name") {
                if let Ok(module) = module_node.utf8_text(ctx.source) {
                    ctx.push_rel(
                        None,
                        Some(module.to_string()),
                        RelationshipKind::Imports,
                        PythonExtractor::line(node.start_position()),
                    );
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, ctx, enclosing_qname, enclosing_id, in_class);
    }
}

/// Calls are scanned only within a function/method body, not recursed into
/// nested function definitions (those get their own `extract_calls` pass).
fn extract_calls(node: Node, ctx: &mut Ctx, enclosing: EntityId) {
    if node.kind() == "function_definition" {
        return;
    }
    if node.kind() == "call" {
        if let Some(func) = node.child_by_field_name("function") {
            if let Ok(callee) = func.utf8_text(ctx.source) {
                ctx.push_rel(
                    Some(enclosing),
                    Some(callee.to_string()),
                    RelationshipKind::Calls,
                    PythonExtractor::line(node.start_position()),
                );
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_calls(child, ctx, enclosing);
    }
}

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> anyhow::Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;
        let request = ParseRequest {
            file_type: FileType::Python,
            content: source_code.to_string(),
            path: PathBuf::from(path),
        };
        let parse_result = self.parser_pool.parse_blocking(request)?;

        let mut ctx = Ctx { path, source: content, entities: Vec::new(), relationships: Vec::new(), rel_seq: 0 };
        walk(parse_result.tree.root_node(), &mut ctx, None, None, false);

        Ok(ExtractionResult { entities: ctx.entities, relationships: ctx.relationships })
    }
}
