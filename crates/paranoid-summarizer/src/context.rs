//! Builds the compact graph-context block prepended to `{content}` at
//! context-level 1 (and its alias, level 2 — see the design notes' open
//! question on retrieval-augmented summarization).

use paranoid_core::Entity;
use paranoid_store::graph_api;
use paranoid_store::Store;
use std::path::Path;

/// `""` when the file has no entities to report on, so callers can substitute
/// it into `{content}` without an empty header.
pub async fn build_graph_context(store: &dyn Store, path: &Path) -> anyhow::Result<String> {
    let entities = store.all_entities(path).await?;
    if entities.is_empty() {
        return Ok(String::new());
    }

    let mut lines = vec!["Graph context:".to_string()];
    for entity in &entities {
        lines.push(describe_entity(store, entity).await?);
    }

    let imports: Vec<String> =
        store.imports_of(path).await?.into_iter().filter_map(|r| r.to_file).collect();
    if !imports.is_empty() {
        lines.push(format!("- imports: {}", imports.join(", ")));
    }

    let importers: Vec<String> = graph_api::get_importers(store, path)
        .await?
        .into_iter()
        .map(|r| r.from_file.display().to_string())
        .collect();
    if !importers.is_empty() {
        lines.push(format!("- imported by: {}", importers.join(", ")));
    }

    lines.push(String::new());
    Ok(lines.join("\n"))
}

async fn describe_entity(store: &dyn Store, entity: &Entity) -> anyhow::Result<String> {
    let callers = graph_api::get_callers(store, entity.id).await?;
    let callees = graph_api::get_callees(store, entity.id).await?;
    Ok(format!(
        "- {} `{}`: {} caller(s), {} callee(s)",
        entity_kind_label(entity),
        entity.qualified_name,
        callers.len(),
        callees.len()
    ))
}

fn entity_kind_label(entity: &Entity) -> &'static str {
    match entity.kind {
        paranoid_core::EntityKind::Class => "class",
        paranoid_core::EntityKind::Function => "function",
        paranoid_core::EntityKind::Method => "method",
    }
}

/// Truncates `content` to at most `max_bytes`, cutting on a UTF-8 boundary
/// and marking that truncation happened so prompts stay honest about it.
pub fn truncate_content(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }
    let mut cut = max_bytes;
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\n... (truncated)", &content[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_content_is_a_no_op_under_the_limit() {
        assert_eq!(truncate_content("hello", 100), "hello");
    }

    #[test]
    fn truncate_content_cuts_and_marks_oversized_input() {
        let long = "a".repeat(100);
        let truncated = truncate_content(&long, 10);
        assert!(truncated.starts_with(&"a".repeat(10)));
        assert!(truncated.ends_with("(truncated)"));
    }
}
