//! Graph API (component H) — typed queries over the relationship table.
//! Layered directly on [`Store`]; no separate in-memory graph structure is
//! maintained, since the store is already the source of truth.

use crate::traits::Store;
use paranoid_core::{Entity, EntityId, Language, Relationship};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A caller or callee, enriched with the calling/called entity's qualified
/// name when it is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMatch {
    pub relationship: Relationship,
    pub entity: Option<Entity>,
}

pub async fn get_callers(store: &dyn Store, entity: EntityId) -> anyhow::Result<Vec<EdgeMatch>> {
    enrich(store, store.callers_of(entity).await?, |r| r.from_entity).await
}

pub async fn get_callees(store: &dyn Store, entity: EntityId) -> anyhow::Result<Vec<EdgeMatch>> {
    enrich(store, store.callees_of(entity).await?, |r| r.to_entity).await
}

pub async fn get_imports(store: &dyn Store, file: &std::path::Path) -> anyhow::Result<Vec<Relationship>> {
    store.imports_of(file).await
}

/// Who imports `file`. The store only knows the raw, unresolved module
/// text recorded at the import site (`to_file`), so we derive the set of
/// module names `file` itself could plausibly be imported as and match
/// each against `importers_of`, merging and deduplicating the results.
pub async fn get_importers(store: &dyn Store, file: &Path) -> anyhow::Result<Vec<Relationship>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in module_candidates(file) {
        for rel in store.importers_of(&candidate).await? {
            if seen.insert(rel.id) {
                out.push(rel);
            }
        }
    }
    Ok(out)
}

/// Candidate module names a file could be imported under, derived from its
/// path. Python import statements name a dotted module path, so we join
/// the file's path components (minus extension) with `.`. Brace-family
/// languages (JavaScript, TypeScript, Java, C, C++, Go) import by relative
/// specifier instead, so we try the file's path relative to the project
/// root with and without its extension, with a leading `./`, and its bare
/// stem — covering the common forms those import statements actually use.
fn module_candidates(file: &Path) -> Vec<String> {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
    let no_ext = strip_extension(file);

    match Language::from_path(file) {
        Language::Python => {
            let dotted = no_ext
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join(".");
            let mut out = vec![dotted];
            if out[0] != stem {
                out.push(stem);
            }
            out
        }
        _ => {
            let rel = no_ext.to_string_lossy().replace('\\', "/");
            let mut out = vec![rel.clone(), format!("./{rel}"), stem.clone(), format!("./{stem}")];
            out.dedup();
            out
        }
    }
}

fn strip_extension(file: &Path) -> PathBuf {
    match file.extension() {
        Some(_) => file.with_extension(""),
        None => file.to_path_buf(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceTree {
    pub parents: Vec<EdgeMatch>,
    pub children: Vec<EdgeMatch>,
}

pub async fn get_inheritance_tree(store: &dyn Store, class: EntityId) -> anyhow::Result<InheritanceTree> {
    let parents = enrich(store, store.parents_of(class).await?, |r| r.to_entity).await?;
    let children = enrich(store, store.children_of(class).await?, |r| r.from_entity).await?;
    Ok(InheritanceTree { parents, children })
}

/// Qualified-name lookup, falling back to simple-name on miss. May return
/// more than one match — callers decide what "ambiguous" means for them.
pub async fn find_definition(store: &dyn Store, name: &str) -> anyhow::Result<Vec<Entity>> {
    let by_qualified = store.get_entities_by_qualified_name(name).await?;
    if !by_qualified.is_empty() {
        return Ok(by_qualified);
    }
    store.get_entities_by_simple_name(name).await
}

async fn enrich(
    store: &dyn Store,
    rels: Vec<Relationship>,
    pick: impl Fn(&Relationship) -> Option<EntityId>,
) -> anyhow::Result<Vec<EdgeMatch>> {
    let mut out = Vec::with_capacity(rels.len());
    for rel in rels {
        let entity = match pick(&rel) {
            Some(id) => store.get_entity_by_id(id).await?,
            None => None,
        };
        out.push(EdgeMatch { relationship: rel, entity });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_candidates_are_dotted() {
        let candidates = module_candidates(Path::new("pkg/auth.py"));
        assert!(candidates.contains(&"pkg.auth".to_string()));
        assert!(candidates.contains(&"auth".to_string()));
    }

    #[test]
    fn brace_family_candidates_are_relative_specifiers() {
        let candidates = module_candidates(Path::new("src/utils/helper.ts"));
        assert!(candidates.contains(&"src/utils/helper".to_string()));
        assert!(candidates.contains(&"./src/utils/helper".to_string()));
        assert!(candidates.contains(&"helper".to_string()));
        assert!(candidates.contains(&"./helper".to_string()));
    }
}
