//! Orchestrates graph extraction: the incremental skip rule, dispatch to
//! the per-language extractor, the resolution pass, and the atomic
//! replace-per-file write into the Store.

use crate::extractor::get_extractor;
use crate::parser_pool::ParserPool;
use crate::resolve::resolve_relationships;
use paranoid_core::{content_hash, IgnoreMatcher};
use paranoid_store::Store;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOutcome {
    pub path: PathBuf,
    pub entities: usize,
    pub relationships: usize,
    pub skipped: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeTreeSummary {
    pub outcomes: Vec<AnalyzeOutcome>,
}

impl AnalyzeTreeSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

pub struct Coordinator<S: Store + ?Sized> {
    store: Arc<S>,
    parser_pool: ParserPool,
}

impl<S: Store + ?Sized + 'static> Coordinator<S> {
    pub fn new(store: Arc<S>, parser_pool: ParserPool) -> Self {
        Self { store, parser_pool }
    }

    /// Extracts a single file, honoring the AnalysisFileHash skip rule
    /// unless `force` is set.
    pub async fn analyze_file(&self, path: &Path, force: bool) -> AnalyzeOutcome {
        let hash = match content_hash(path) {
            Ok(h) => h,
            Err(e) => return self.error_outcome(path, e.to_string()),
        };

        if !force {
            match self.store.get_analysis_hash(path).await {
                Ok(Some(prev)) if prev == hash => {
                    return AnalyzeOutcome { path: path.to_path_buf(), skipped: true, ..Default::default() };
                }
                Ok(_) => {}
                Err(e) => return self.error_outcome(path, e.to_string()),
            }
        }

        let Some(extractor) = get_extractor(path, self.parser_pool.clone()) else {
            tracing::debug!(?path, "no extractor registered for this extension");
            return AnalyzeOutcome { path: path.to_path_buf(), skipped: true, ..Default::default() };
        };

        let content = match std::fs::read(path) {
            Ok(c) => c,
            Err(e) => return self.error_outcome(path, e.to_string()),
        };

        let result = match extractor.extract(path, &content) {
            Ok(r) => r,
            Err(e) => {
                self.record_error(path, &e.to_string()).await;
                return self.error_outcome(path, e.to_string());
            }
        };

        if let Err(e) = self.store.put_entities_for_file(path, &result.entities).await {
            return self.error_outcome(path, e.to_string());
        }

        // Entities are committed above before resolving so that intra-file
        // references (the common case) find their own file's entities
        // already queryable in the store, not just entities from other,
        // previously-analyzed files.
        let resolved = match resolve_relationships(self.store.as_ref(), result.relationships).await {
            Ok(r) => r,
            Err(e) => return self.error_outcome(path, e.to_string()),
        };

        if let Err(e) = self.store.put_relationships(path, &resolved).await {
            return self.error_outcome(path, e.to_string());
        }
        if let Err(e) = self.store.set_analysis_hash(path, &hash).await {
            return self.error_outcome(path, e.to_string());
        }

        AnalyzeOutcome {
            path: path.to_path_buf(),
            entities: result.entities.len(),
            relationships: resolved.len(),
            skipped: false,
            error: None,
        }
    }

    /// Walks `root`, analyzing every non-ignored file. Order within a
    /// directory is unspecified — unlike the Summarizer's bottom-up walk,
    /// extraction has no parent/child dependency.
    pub async fn analyze_tree(&self, root: &Path, ignore: &IgnoreMatcher, force: bool) -> anyhow::Result<AnalyzeTreeSummary> {
        let mut outcomes = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(e) => e,
                Err(e) => {
                    outcomes.push(self.error_outcome(&dir, e.to_string()));
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let relative = path.strip_prefix(root).unwrap_or(&path);
                let is_dir = path.is_dir();
                if ignore.is_ignored(relative, is_dir) {
                    continue;
                }
                if is_dir {
                    stack.push(path);
                } else {
                    outcomes.push(self.analyze_file(&path, force).await);
                }
            }
        }

        Ok(AnalyzeTreeSummary { outcomes })
    }

    async fn record_error(&self, path: &Path, message: &str) {
        if let Ok(Some(mut summary)) = self.store.get_summary(path).await {
            summary.error = Some(message.to_string());
            let _ = self.store.upsert_summary(&summary).await;
        }
    }

    fn error_outcome(&self, path: &Path, message: String) -> AnalyzeOutcome {
        AnalyzeOutcome { path: path.to_path_buf(), error: Some(message), ..Default::default() }
    }
}
