//! `Store` — the port trait every command (`init`, `summarize`, `analyze`,
//! `index`, `ask`) is written against. `SqliteStore` is the only
//! implementation today; the trait exists so callers (and tests) don't
//! depend on the storage engine directly.

use async_trait::async_trait;
use paranoid_core::{
    AnalysisFileHash, DocQuality, Entity, EntityId, IgnorePattern, Relationship, RelationshipId,
    Summary, SummaryContext, Vector, VectorKind,
};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    pub by_kind: Vec<(String, u64)>,
    pub by_language: Vec<(String, u64)>,
    pub by_model: Vec<(String, u64)>,
    pub total: u64,
    pub errored: u64,
}

/// A nearest-neighbor match: the stored vector's kind/object id and its
/// cosine similarity to the query embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub kind: VectorKind,
    pub object_id: String,
    pub similarity: f32,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Summaries
    async fn get_summary(&self, path: &Path) -> anyhow::Result<Option<Summary>>;
    async fn upsert_summary(&self, summary: &Summary) -> anyhow::Result<()>;
    /// Cascades to Entities, Relationships, SummaryContext, AnalysisFileHash,
    /// and Vectors keyed on this path or its entities.
    async fn delete_summary(&self, path: &Path) -> anyhow::Result<()>;
    /// Direct children only: paths of the form `parent + "/" + single segment`.
    async fn list_children(&self, path: &Path) -> anyhow::Result<Vec<Summary>>;
    async fn all_summaries(&self, scope: &Path) -> anyhow::Result<Vec<Summary>>;
    async fn summary_stats(&self, scope: &Path) -> anyhow::Result<StoreStats>;

    // Entities
    async fn put_entities_for_file(&self, file: &Path, entities: &[Entity]) -> anyhow::Result<()>;
    async fn get_entity_by_id(&self, id: EntityId) -> anyhow::Result<Option<Entity>>;
    async fn get_entities_by_qualified_name(&self, name: &str) -> anyhow::Result<Vec<Entity>>;
    async fn get_entities_by_simple_name(&self, name: &str) -> anyhow::Result<Vec<Entity>>;
    async fn all_entities(&self, scope: &Path) -> anyhow::Result<Vec<Entity>>;

    // Relationships
    async fn put_relationships(&self, file: &Path, rels: &[Relationship]) -> anyhow::Result<()>;
    async fn callers_of(&self, entity: EntityId) -> anyhow::Result<Vec<Relationship>>;
    async fn callees_of(&self, entity: EntityId) -> anyhow::Result<Vec<Relationship>>;
    async fn importers_of(&self, module: &str) -> anyhow::Result<Vec<Relationship>>;
    async fn imports_of(&self, file: &Path) -> anyhow::Result<Vec<Relationship>>;
    async fn parents_of(&self, class: EntityId) -> anyhow::Result<Vec<Relationship>>;
    async fn children_of(&self, class: EntityId) -> anyhow::Result<Vec<Relationship>>;

    // Context
    async fn get_summary_context(&self, path: &Path) -> anyhow::Result<Option<SummaryContext>>;
    async fn set_summary_context(&self, context: &SummaryContext) -> anyhow::Result<()>;

    // Analysis file hashes
    async fn get_analysis_hash(&self, path: &Path) -> anyhow::Result<Option<String>>;
    async fn set_analysis_hash(&self, path: &Path, hash: &str) -> anyhow::Result<()>;

    // Vectors
    async fn put_vector(&self, vector: &Vector) -> anyhow::Result<()>;
    async fn nearest(&self, kind: VectorKind, query: &[f32], k: usize) -> anyhow::Result<Vec<VectorMatch>>;
    async fn vector_for(&self, kind: VectorKind, object_id: &str) -> anyhow::Result<Option<Vector>>;

    // Metadata
    async fn get_metadata(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set_metadata(&self, key: &str, value: &str) -> anyhow::Result<()>;

    // Ignore patterns (append-only audit)
    async fn add_ignore_pattern(&self, pattern: &IgnorePattern) -> anyhow::Result<()>;
    async fn list_ignore_patterns(&self) -> anyhow::Result<Vec<IgnorePattern>>;

    // Doc quality
    async fn get_doc_quality(&self, entity: EntityId) -> anyhow::Result<Option<DocQuality>>;
    async fn set_doc_quality(&self, quality: &DocQuality) -> anyhow::Result<()>;
}

/// Helper shared by Store implementations for deriving a relationship id
/// stable across re-extraction of the same source (location included so
/// multiple calls on one line still get distinct ids).
pub fn relationship_id(from_file: &Path, location: &str, to: &str) -> RelationshipId {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    from_file.hash(&mut hasher);
    location.hash(&mut hasher);
    to.hash(&mut hasher);
    RelationshipId(hasher.finish())
}
