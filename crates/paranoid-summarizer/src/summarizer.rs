//! The Summarizer (component E): bottom-up directory walk, incremental
//! skip via `needs_summarization`, prompt assembly, and persistence of
//! `Summary` + `SummaryContext`.

use crate::context::{build_graph_context, truncate_content};
use crate::templates::{
    length_bucket, paragraph_count, render_dir_prompt, render_file_prompt, TemplateRegistry,
};
use paranoid_core::{
    content_hash, needs_summarization, tree_hash, CoreError, IgnoreMatcher, Language, Summary,
    SummaryKind,
};
use paranoid_core::{Config, ContextLevel};
use paranoid_modelhost::{GenerateOptions, ModelHost};
use paranoid_store::lookup::StoreLookup;
use paranoid_store::Store;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prompts longer than this (in bytes) are rejected rather than sent to the
/// model host, since truncation of `{content}` alone cannot help once the
/// surrounding template and graph context push it over.
const MAX_PROMPT_BYTES: usize = 120_000;
/// `{content}` itself is capped well below `MAX_PROMPT_BYTES` to leave room
/// for the template boilerplate and, at context-level 1, the graph block.
const MAX_CONTENT_BYTES: usize = 60_000;

const PROMPT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default)]
pub struct SummarizeOutcome {
    pub path: PathBuf,
    pub kind: Option<SummaryKind>,
    pub skipped: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SummarizeTreeSummary {
    pub outcomes: Vec<SummarizeOutcome>,
}

impl SummarizeTreeSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn summarized(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.skipped && o.error.is_none()).count()
    }
}

pub struct Summarizer<S: Store + ?Sized, M: ModelHost + ?Sized> {
    store: Arc<S>,
    model_host: Arc<M>,
    config: Config,
    templates: TemplateRegistry,
}

impl<S: Store + ?Sized + 'static, M: ModelHost + ?Sized + 'static> Summarizer<S, M> {
    pub fn new(store: Arc<S>, model_host: Arc<M>, config: Config, templates: TemplateRegistry) -> Self {
        Self { store, model_host, config, templates }
    }

    /// Walks `root` bottom-up: a directory's children (files and
    /// subdirectories) are all visited before the directory itself, since a
    /// directory's tree hash is a function of its children's stored hashes.
    pub async fn summarize_tree(
        &self,
        root: &Path,
        ignore: &IgnoreMatcher,
        force: bool,
    ) -> anyhow::Result<SummarizeTreeSummary> {
        let mut outcomes = Vec::new();
        self.walk_dir(root, root, ignore, force, &mut outcomes).await?;
        Ok(SummarizeTreeSummary { outcomes })
    }

    async fn walk_dir(
        &self,
        root: &Path,
        dir: &Path,
        ignore: &IgnoreMatcher,
        force: bool,
        outcomes: &mut Vec<SummarizeOutcome>,
    ) -> anyhow::Result<()> {
        let mut entries: Vec<_> = match std::fs::read_dir(dir) {
            Ok(e) => e.flatten().collect(),
            Err(e) => {
                outcomes.push(self.error_outcome(dir, e.to_string()));
                return Ok(());
            }
        };
        entries.sort_by_key(|e| e.path());

        for entry in &entries {
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let is_dir = path.is_dir();
            if ignore.is_ignored(relative, is_dir) {
                continue;
            }
            if is_dir {
                Box::pin(self.walk_dir(root, &path, ignore, force, outcomes)).await?;
            } else {
                outcomes.push(self.summarize_file(&path, force).await);
            }
        }

        outcomes.push(self.summarize_directory(dir, force).await);

        Ok(())
    }

    /// Summarizes a single file, honoring smart invalidation unless `force`.
    pub async fn summarize_file(&self, path: &Path, force: bool) -> SummarizeOutcome {
        match self.summarize_file_inner(path, force).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_error(path, &e.to_string()).await;
                self.error_outcome(path, e.to_string())
            }
        }
    }

    async fn summarize_file_inner(&self, path: &Path, force: bool) -> anyhow::Result<SummarizeOutcome> {
        let hash = content_hash(path)?;
        let lookup = StoreLookup(self.store.clone());

        if !force && !needs_summarization(path, &hash, &lookup, &self.config).await? {
            return Ok(SummarizeOutcome { path: path.to_path_buf(), kind: Some(SummaryKind::File), skipped: true, error: None });
        }

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes).to_string();
        let language = Language::from_path(path);
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_string();

        let existing = self.store.get_summary(path).await?;
        let existing_text = existing.as_ref().map(|s| s.description.as_str()).unwrap_or("none").to_string();

        let context_level = ContextLevel::from_u8(self.config.default_context_level).unwrap_or(ContextLevel::Isolated);
        let truncated = truncate_content(&content, MAX_CONTENT_BYTES);
        let content_for_prompt = if context_level != ContextLevel::Isolated {
            let graph_block = build_graph_context(self.store.as_ref(), path).await?;
            format!("{graph_block}{truncated}")
        } else {
            truncated
        };

        let template = self.templates.file_template(language.label());
        let prompt = render_file_prompt(
            template,
            &path.display().to_string(),
            &content_for_prompt,
            &existing_text,
            length_bucket(bytes.len()),
            &extension,
        );

        if prompt.len() > MAX_PROMPT_BYTES {
            return Err(CoreError::ContextOverflow { path: path.to_path_buf() }.into());
        }

        let generated = self
            .model_host
            .generate(&self.config.default_model, &prompt, GenerateOptions::default())
            .await?;

        let now = chrono::Utc::now();
        let summary = Summary {
            path: path.to_path_buf(),
            kind: SummaryKind::File,
            hash,
            description: generated.text,
            extension: Some(extension),
            language: Some(language.label().to_string()),
            error: None,
            needs_update: false,
            model: self.config.default_model.clone(),
            model_version: generated.model_version,
            prompt_version: PROMPT_VERSION,
            context_level,
            generated_at: existing.as_ref().map(|s| s.generated_at).unwrap_or(now),
            updated_at: now,
            tokens_used: Some(generated.tokens_used),
            generation_time_ms: Some(generated.elapsed_ms),
        };
        self.store.upsert_summary(&summary).await?;

        if context_level != ContextLevel::Isolated {
            let context = lookup.live_context(path).await?;
            self.store.set_summary_context(&context).await?;
        }

        Ok(SummarizeOutcome { path: path.to_path_buf(), kind: Some(SummaryKind::File), skipped: false, error: None })
    }

    /// Summarizes a directory from its children's already-persisted
    /// Summaries. Directories receive no graph context and are never
    /// skipped on smart-invalidation drift (only content/tree-hash change).
    pub async fn summarize_directory(&self, path: &Path, force: bool) -> SummarizeOutcome {
        match self.summarize_directory_inner(path, force).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_error(path, &e.to_string()).await;
                self.error_outcome(path, e.to_string())
            }
        }
    }

    async fn summarize_directory_inner(&self, path: &Path, force: bool) -> anyhow::Result<SummarizeOutcome> {
        let children = self.store.list_children(path).await?;
        let hash = tree_hash(children.iter().map(|c| c.hash.clone()).collect());

        let lookup = StoreLookup(self.store.clone());
        if !force && !needs_summarization(path, &hash, &lookup, &self.config).await? {
            return Ok(SummarizeOutcome {
                path: path.to_path_buf(),
                kind: Some(SummaryKind::Directory),
                skipped: true,
                error: None,
            });
        }

        let existing = self.store.get_summary(path).await?;
        let existing_text = existing.as_ref().map(|s| s.description.as_str()).unwrap_or("none").to_string();

        let mut names: Vec<&Summary> = children.iter().collect();
        names.sort_by(|a, b| a.path.cmp(&b.path));
        let children_text = names
            .iter()
            .map(|c| {
                let name = c.path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                let kind = match c.kind {
                    SummaryKind::File => "file",
                    SummaryKind::Directory => "dir",
                };
                let first_line = c.description.lines().next().unwrap_or("");
                format!("- {name} ({kind}): {first_line}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let template = self.templates.directory_template();
        let prompt = render_dir_prompt(
            template,
            &path.display().to_string(),
            &children_text,
            &existing_text,
            paragraph_count(children.len()),
        );

        if prompt.len() > MAX_PROMPT_BYTES {
            return Err(CoreError::ContextOverflow { path: path.to_path_buf() }.into());
        }

        let generated = self
            .model_host
            .generate(&self.config.default_model, &prompt, GenerateOptions::default())
            .await?;

        let now = chrono::Utc::now();
        let summary = Summary {
            path: path.to_path_buf(),
            kind: SummaryKind::Directory,
            hash,
            description: generated.text,
            extension: None,
            language: None,
            error: None,
            needs_update: false,
            model: self.config.default_model.clone(),
            model_version: generated.model_version,
            prompt_version: PROMPT_VERSION,
            context_level: ContextLevel::Isolated,
            generated_at: existing.as_ref().map(|s| s.generated_at).unwrap_or(now),
            updated_at: now,
            tokens_used: Some(generated.tokens_used),
            generation_time_ms: Some(generated.elapsed_ms),
        };
        self.store.upsert_summary(&summary).await?;

        Ok(SummarizeOutcome { path: path.to_path_buf(), kind: Some(SummaryKind::Directory), skipped: false, error: None })
    }

    async fn record_error(&self, path: &Path, message: &str) {
        if let Ok(Some(mut summary)) = self.store.get_summary(path).await {
            summary.error = Some(message.to_string());
            let _ = self.store.upsert_summary(&summary).await;
        }
    }

    fn error_outcome(&self, path: &Path, message: String) -> SummarizeOutcome {
        SummarizeOutcome { path: path.to_path_buf(), kind: None, skipped: false, error: Some(message) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_tree_summary_counts_failures_and_successes() {
        let summary = SummarizeTreeSummary {
            outcomes: vec![
                SummarizeOutcome { path: "a".into(), kind: Some(SummaryKind::File), skipped: false, error: None },
                SummarizeOutcome { path: "b".into(), kind: None, skipped: false, error: Some("boom".into()) },
                SummarizeOutcome { path: "c".into(), kind: Some(SummaryKind::File), skipped: true, error: None },
            ],
        };
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.summarized(), 1);
    }
}
