//! paranoid-core — data model, hashing, ignore matching, configuration,
//! error taxonomy, job registry, and project-root discovery shared by
//! every other crate.

pub mod config;
pub mod error;
pub mod hasher;
pub mod ignore;
pub mod jobs;
pub mod model;
pub mod project;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use hasher::{content_hash, needs_summarization, tree_hash, SummarizationLookup};
pub use ignore::IgnoreMatcher;
pub use jobs::{JobId, JobRegistry, JobStatus};
pub use model::{
    AnalysisFileHash, ContextLevel, DocQuality, Entity, EntityId, EntityKind, IgnorePattern,
    IgnorePatternSource, Language, Relationship, RelationshipId, RelationshipKind, Summary,
    SummaryContext, SummaryKind, Vector, VectorKind,
};
