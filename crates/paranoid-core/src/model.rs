//! Data model types shared by every crate in the workspace.
//!
//! These mirror the persisted shape of the project store (see
//! `paranoid-store`) rather than any particular wire format.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher as _};
use std::path::{Path, PathBuf};

/// Opaque, stable-within-a-project identifier for an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Opaque identifier for a [`Relationship`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub u64);

impl EntityId {
    /// Derive an id from the fields that make an entity unique within a file.
    /// Two extraction runs over the same source produce the same id, which
    /// keeps foreign keys in `Relationship` stable across re-parses that
    /// don't otherwise change the entity.
    pub fn derive(file_path: &Path, qualified_name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        file_path.hash(&mut hasher);
        qualified_name.hash(&mut hasher);
        EntityId(hasher.finish())
    }
}

/// `file` or `directory` — the two kinds of path a [`Summary`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    File,
    Directory,
}

/// How much graph context a summary's prompt was built with.
///
/// `WithRag` is reserved: until retrieval-augmented summarization is
/// implemented it is treated as an alias of `WithGraph` (see the design
/// notes' open question on context-level 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ContextLevel {
    Isolated = 0,
    WithGraph = 1,
    WithRag = 2,
}

impl ContextLevel {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ContextLevel::Isolated),
            1 => Some(ContextLevel::WithGraph),
            2 => Some(ContextLevel::WithRag),
            _ => None,
        }
    }
}

/// A persisted description of a file or directory at a particular
/// content/tree hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub path: PathBuf,
    pub kind: SummaryKind,
    pub hash: String,
    pub description: String,
    pub extension: Option<String>,
    pub language: Option<String>,
    pub error: Option<String>,
    pub needs_update: bool,
    pub model: String,
    pub model_version: Option<String>,
    pub prompt_version: u32,
    pub context_level: ContextLevel,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub tokens_used: Option<u32>,
    pub generation_time_ms: Option<u64>,
}

/// A class, function, or method extracted by static parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub file_path: PathBuf,
    pub kind: EntityKind,
    pub name: String,
    /// Dotted concatenation of enclosing class/function names, e.g.
    /// `Outer.Inner.method`.
    pub qualified_name: String,
    /// For methods: the id of the enclosing class entity.
    pub parent_entity: Option<EntityId>,
    pub start_line: u32,
    pub end_line: u32,
    pub docstring: Option<String>,
    pub signature: Option<String>,
    pub language: String,
}

/// A directed edge between entities/files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Calls,
    Imports,
    Inherits,
    Instantiates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub from_entity: Option<EntityId>,
    pub to_entity: Option<EntityId>,
    pub from_file: PathBuf,
    /// Filled for file-level imports (unresolved module path), and for
    /// still-unresolved call/inherit targets (textual hint).
    pub to_file: Option<String>,
    pub kind: RelationshipKind,
    /// `file:line` of the edge's syntactic origin.
    pub location: String,
}

/// Snapshot used by smart invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryContext {
    pub path: PathBuf,
    pub imports_hash: String,
    pub callers_count: u32,
    pub callees_count: u32,
    pub context_version: u32,
}

/// Last content hash for which graph extraction ran, used to skip
/// unchanged files during `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFileHash {
    pub path: PathBuf,
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocQuality {
    pub entity_id: EntityId,
    pub has_docstring: bool,
    pub has_examples: bool,
    pub has_type_hints: bool,
    pub priority_score: f32,
    pub last_reviewed: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnorePatternSource {
    File,
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnorePattern {
    pub pattern: String,
    pub added_at: chrono::DateTime<chrono::Utc>,
    pub source: IgnorePatternSource,
}

/// Kind of object a [`Vector`] row embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    Summary,
    Entity,
}

/// `object_id` is a Summary path (serialized) when `kind == Summary`, or an
/// [`EntityId`] (serialized as its integer) when `kind == Entity`.
///
/// `source_hash` is the content/tree hash (for summaries) or a hash of the
/// entity's docstring+signature (for entities) at the time this vector was
/// embedded, letting the Indexer tell "source changed since this vector was
/// written" apart from "embedding model changed" without re-embedding first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub kind: VectorKind,
    pub object_id: String,
    pub embedding: Vec<f32>,
    pub model: String,
    pub source_hash: String,
}

/// Detected source language of a file, sniffed from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Unknown,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Language::Python,
            Some("js" | "jsx" | "mjs" | "cjs") => Language::JavaScript,
            Some("ts" | "tsx") => Language::TypeScript,
            Some("rs") => Language::Rust,
            Some("go") => Language::Go,
            Some("java") => Language::Java,
            Some("c" | "h") => Language::C,
            Some("cpp" | "cc" | "cxx" | "hpp") => Language::Cpp,
            _ => Language::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_is_stable_for_same_inputs() {
        let a = EntityId::derive(Path::new("src/a.py"), "User.login");
        let b = EntityId::derive(Path::new("src/a.py"), "User.login");
        assert_eq!(a, b);
    }

    #[test]
    fn entity_id_differs_across_qualified_names() {
        let a = EntityId::derive(Path::new("src/a.py"), "User.login");
        let b = EntityId::derive(Path::new("src/a.py"), "User.logout");
        assert_ne!(a, b);
    }

    #[test]
    fn language_from_path_detects_typescript() {
        assert_eq!(Language::from_path(Path::new("x.tsx")), Language::TypeScript);
        assert_eq!(Language::from_path(Path::new("x.unknownext")), Language::Unknown);
    }

    #[test]
    fn context_level_round_trips_through_u8() {
        assert_eq!(ContextLevel::from_u8(1), Some(ContextLevel::WithGraph));
        assert_eq!(ContextLevel::from_u8(9), None);
    }
}
