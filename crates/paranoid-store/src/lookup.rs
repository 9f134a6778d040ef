//! Implements `paranoid_core::hasher::SummarizationLookup` for any [`Store`],
//! bridging the narrow hashing-side contract to the full storage engine.
//!
//! The "current" half of smart invalidation is computed live from the
//! relationship table (current callers/callees/imports of the file's
//! entities), not from any cached count, so drift introduced by edits to
//! *other* files is visible without touching this file's content hash.

use crate::traits::Store;
use async_trait::async_trait;
use paranoid_core::hasher::SummarizationLookup;
use paranoid_core::model::SummaryContext;
use paranoid_core::{content_hash, CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

pub struct StoreLookup<S: Store + ?Sized>(pub Arc<S>);

impl<S: Store + ?Sized> StoreLookup<S> {
    fn to_io_err(path: &Path, e: anyhow::Error) -> CoreError {
        CoreError::IoError { path: path.to_path_buf(), source: std::io::Error::other(e.to_string()) }
    }

    /// Live counts/imports for the entities currently recorded for `path`,
    /// summed across the file's entities (a file typically has several).
    ///
    /// Public so callers that persist a fresh [`SummaryContext`] after
    /// generating a summary (the Summarizer) can reuse the same computation
    /// `current_context` uses for drift detection, instead of recomputing it.
    pub async fn live_context(&self, path: &Path) -> anyhow::Result<SummaryContext> {
        let entities = self.0.all_entities(path).await?;
        let mut callers = 0u32;
        let mut callees = 0u32;
        for entity in &entities {
            callers += self.0.callers_of(entity.id).await?.len() as u32;
            callees += self.0.callees_of(entity.id).await?.len() as u32;
        }

        let mut modules: Vec<String> =
            self.0.imports_of(path).await?.into_iter().filter_map(|r| r.to_file).collect();
        modules.sort();
        let mut hasher = Sha256::new();
        hasher.update(modules.join(",").as_bytes());
        let imports_hash = hasher.finalize().iter().map(|b| format!("{b:02x}")).collect();

        Ok(SummaryContext {
            path: path.to_path_buf(),
            imports_hash,
            callers_count: callers,
            callees_count: callees,
            context_version: 1,
        })
    }
}

#[async_trait]
impl<S: Store + ?Sized> SummarizationLookup for StoreLookup<S> {
    async fn summary_hash(&self, path: &Path) -> CoreResult<Option<(String, bool)>> {
        let summary = self.0.get_summary(path).await.map_err(|e| Self::to_io_err(path, e))?;
        Ok(summary.map(|s| (s.hash, s.needs_update)))
    }

    async fn current_context(&self, path: &Path) -> CoreResult<Option<(SummaryContext, SummaryContext)>> {
        let Some(stored) = self.0.get_summary_context(path).await.map_err(|e| Self::to_io_err(path, e))? else {
            return Ok(None);
        };
        let live = self.live_context(path).await.map_err(|e| Self::to_io_err(path, e))?;
        Ok(Some((stored, live)))
    }
}

/// Thin re-export so callers don't also need to depend on `paranoid-core`
/// just to hash a file before consulting [`StoreLookup`].
pub fn hash_file(path: &Path) -> CoreResult<String> {
    content_hash(path)
}
