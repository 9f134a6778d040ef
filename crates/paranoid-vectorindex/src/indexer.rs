//! The Indexer (component F): embeds stale summaries/entities and writes
//! them into the vector table.

use crate::staleness::{is_stale, IndexMode};
use paranoid_core::{tree_hash, Config, Vector, VectorKind};
use paranoid_modelhost::ModelHost;
use paranoid_store::Store;
use std::path::Path;
use std::sync::Arc;

/// Which object kinds a run should cover. Each is independently flaggable
/// per §4.F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectKinds {
    pub summaries: bool,
    pub entities: bool,
}

impl Default for ObjectKinds {
    fn default() -> Self {
        Self { summaries: true, entities: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexSummary {
    pub embedded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Indexer<S: Store + ?Sized, M: ModelHost + ?Sized> {
    store: Arc<S>,
    model_host: Arc<M>,
    config: Config,
}

impl<S: Store + ?Sized + 'static, M: ModelHost + ?Sized + 'static> Indexer<S, M> {
    pub fn new(store: Arc<S>, model_host: Arc<M>, config: Config) -> Self {
        Self { store, model_host, config }
    }

    pub async fn index(&self, scope: &Path, mode: IndexMode, kinds: ObjectKinds) -> anyhow::Result<IndexSummary> {
        let mut summary = IndexSummary::default();

        if kinds.summaries {
            for s in self.store.all_summaries(scope).await? {
                if s.error.is_some() {
                    continue;
                }
                match self.index_summary(&s.path.to_string_lossy(), &s.hash, &s.description, mode).await {
                    Ok(true) => summary.embedded += 1,
                    Ok(false) => summary.skipped += 1,
                    Err(e) => {
                        tracing::warn!(path = %s.path.display(), error = %e, "failed to embed summary");
                        summary.failed += 1;
                    }
                }
            }
        }

        if kinds.entities {
            for e in self.store.all_entities(scope).await? {
                let text = entity_embedding_text(&e);
                let hash = tree_hash(vec![text.clone()]);
                let object_id = e.id.0.to_string();
                match self.index_object(VectorKind::Entity, &object_id, &hash, &text, mode).await {
                    Ok(true) => summary.embedded += 1,
                    Ok(false) => summary.skipped += 1,
                    Err(err) => {
                        tracing::warn!(entity = %e.qualified_name, error = %err, "failed to embed entity");
                        summary.failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn index_summary(&self, path: &str, hash: &str, text: &str, mode: IndexMode) -> anyhow::Result<bool> {
        self.index_object(VectorKind::Summary, path, hash, text, mode).await
    }

    /// Returns `Ok(true)` if the object was (re-)embedded, `Ok(false)` if it
    /// was already fresh.
    async fn index_object(
        &self,
        kind: VectorKind,
        object_id: &str,
        hash: &str,
        text: &str,
        mode: IndexMode,
    ) -> anyhow::Result<bool> {
        let model = self.config.default_embedding_model.clone();
        if !is_stale(self.store.as_ref(), kind, object_id, hash, &model, mode).await? {
            return Ok(false);
        }

        let embedding = self.model_host.embed(&model, text).await?;
        self.store
            .put_vector(&Vector {
                kind,
                object_id: object_id.to_string(),
                embedding,
                model,
                source_hash: hash.to_string(),
            })
            .await?;
        Ok(true)
    }
}

fn entity_embedding_text(entity: &paranoid_core::Entity) -> String {
    let mut parts = vec![entity.qualified_name.clone()];
    if let Some(sig) = &entity.signature {
        parts.push(sig.clone());
    }
    if let Some(doc) = &entity.docstring {
        parts.push(doc.clone());
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_embedding_text_includes_qualified_name_signature_and_docstring() {
        let entity = paranoid_core::Entity {
            id: paranoid_core::EntityId(1),
            file_path: "a.py".into(),
            kind: paranoid_core::EntityKind::Function,
            name: "login".to_string(),
            qualified_name: "User.login".to_string(),
            parent_entity: None,
            start_line: 1,
            end_line: 2,
            docstring: Some("Authenticates a user.".to_string()),
            signature: Some("(self, password)".to_string()),
            language: "python".to_string(),
        };
        let text = entity_embedding_text(&entity);
        assert!(text.contains("User.login"));
        assert!(text.contains("(self, password)"));
        assert!(text.contains("Authenticates a user."));
    }
}
