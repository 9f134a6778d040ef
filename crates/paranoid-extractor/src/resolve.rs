//! Resolution pass: fills `to_entity` on calls/inherits/instantiates edges
//! left unresolved by extraction, by qualified name then simple name.
//! Imports stay file-level (`to_file` carries the raw module path) and are
//! never entity-resolved.

use paranoid_core::{Relationship, RelationshipKind};
use paranoid_store::Store;

pub async fn resolve_relationships(store: &dyn Store, mut rels: Vec<Relationship>) -> anyhow::Result<Vec<Relationship>> {
    for rel in rels.iter_mut() {
        if rel.to_entity.is_some() || rel.kind == RelationshipKind::Imports {
            continue;
        }
        let Some(textual) = rel.to_file.clone() else { continue };

        let mut matches = store.get_entities_by_qualified_name(&textual).await?;
        if matches.is_empty() {
            matches = store.get_entities_by_simple_name(simple_name(&textual)).await?;
        }
        if matches.len() == 1 {
            rel.to_entity = Some(matches[0].id);
        }
    }
    Ok(rels)
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit(['.', ':']).next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_qualification() {
        assert_eq!(simple_name("User.login"), "login");
        assert_eq!(simple_name("user.login"), "login");
        assert_eq!(simple_name("authenticate"), "authenticate");
    }
}
