//! CLI command implementations. Each opens (or requires) a project at
//! `root`, wires up the store/model host, and delegates to the engine
//! crates — this binary owns no analysis logic of its own.

use paranoid_core::{project, CoreError, IgnoreMatcher, JobRegistry, JobStatus};
use paranoid_extractor::{create_parser_pool, Coordinator};
use paranoid_modelhost::OllamaModelHost;
use paranoid_query::QueryRouter;
use paranoid_store::{SqliteStore, Store};
use paranoid_summarizer::{Summarizer, TemplateRegistry};
use paranoid_vectorindex::{IndexMode, Indexer, ObjectKinds};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn init(root: &Path) -> anyhow::Result<()> {
    let created = project::initialize(root)?;
    if created {
        println!("initialized {} at {}", project::PROJECT_DIR, root.display());
    } else {
        println!("{} is already an initialized project", root.display());
    }
    Ok(())
}

pub async fn analyze(root: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let project_root = project::discover_project_root(root)?;
    let store = Arc::new(open_store(&project_root).await?);
    let ignore = build_ignore_matcher(&project_root, store.as_ref()).await?;

    let coordinator = Coordinator::new(store, create_parser_pool());
    let summary = coordinator.analyze_tree(&project_root, &ignore, force).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "files": summary.outcomes.len(),
                "failed": summary.failed(),
            })
        );
    } else {
        println!("analyzed {} file(s), {} failed", summary.outcomes.len(), summary.failed());
    }
    Ok(())
}

/// `summarize` and `index` can run long enough that an external
/// orchestrator wants a job id to poll; each invocation gets its own
/// process-local [`JobRegistry`] (per §5, status does not survive a
/// process restart) registered for the single job this command runs.
pub async fn summarize(root: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let project_root = project::discover_project_root(root)?;
    let config = paranoid_core::Config::load(&project_root)?;
    let store = Arc::new(open_store(&project_root).await?);
    let ignore = build_ignore_matcher(&project_root, store.as_ref()).await?;
    let model_host = Arc::new(model_host_for(&config));
    let templates = TemplateRegistry::load(&project_root.join(project::PROJECT_DIR).join(project::PROMPT_OVERRIDE_FILE))?;

    let jobs = JobRegistry::new();
    let job_id = jobs.start();

    let summarizer = Summarizer::new(store, model_host, config, templates);
    let summary = match summarizer.summarize_tree(&project_root, &ignore, force).await {
        Ok(summary) => {
            jobs.finish(job_id, JobStatus::Completed);
            summary
        }
        Err(e) => {
            jobs.finish(job_id, JobStatus::Failed);
            return Err(e);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "job_id": job_id.0,
                "status": job_status_label(jobs.status(job_id)),
                "summarized": summary.summarized(),
                "failed": summary.failed(),
            })
        );
    } else {
        println!(
            "job {} ({}): summarized {} path(s), {} failed",
            job_id.0,
            job_status_label(jobs.status(job_id)),
            summary.summarized(),
            summary.failed()
        );
    }
    Ok(())
}

pub async fn index(root: &Path, full: bool, summaries: bool, entities: bool, json: bool) -> anyhow::Result<()> {
    let project_root = project::discover_project_root(root)?;
    let config = paranoid_core::Config::load(&project_root)?;
    let store = Arc::new(open_store(&project_root).await?);
    let model_host = Arc::new(model_host_for(&config));

    let jobs = JobRegistry::new();
    let job_id = jobs.start();

    let mode = if full { IndexMode::Full } else { IndexMode::Incremental };
    let indexer = Indexer::new(store, model_host, config);
    let summary = match indexer.index(&project_root, mode, ObjectKinds { summaries, entities }).await {
        Ok(summary) => {
            jobs.finish(job_id, JobStatus::Completed);
            summary
        }
        Err(e) => {
            jobs.finish(job_id, JobStatus::Failed);
            return Err(e);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "job_id": job_id.0,
                "status": job_status_label(jobs.status(job_id)),
                "embedded": summary.embedded,
                "skipped": summary.skipped,
                "failed": summary.failed,
            })
        );
    } else {
        println!(
            "job {} ({}): embedded {}, skipped {}, failed {}",
            job_id.0,
            job_status_label(jobs.status(job_id)),
            summary.embedded,
            summary.skipped,
            summary.failed
        );
    }
    Ok(())
}

fn job_status_label(status: Option<JobStatus>) -> &'static str {
    match status {
        Some(JobStatus::Running) => "running",
        Some(JobStatus::Completed) => "completed",
        Some(JobStatus::Failed) => "failed",
        None => "unknown",
    }
}

pub async fn ask(root: &Path, question: &str, force_rag: bool, json: bool) -> anyhow::Result<()> {
    let project_root = project::discover_project_root(root)?;
    let config = paranoid_core::Config::load(&project_root)?;
    let store = Arc::new(open_store(&project_root).await?);
    let model_host = Arc::new(model_host_for(&config));

    let router = QueryRouter::new(
        store,
        model_host,
        config.default_classifier_model.clone(),
        config.default_model.clone(),
        config.default_embedding_model.clone(),
    );

    match router.ask(question, force_rag).await {
        Ok(answer) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "text": answer.text,
                        "used_generation": answer.used_generation,
                        "sources": format!("{:?}", answer.sources),
                    })
                );
            } else {
                println!("{}", answer.text);
                if !answer.sources.is_empty() {
                    println!("\nsources:");
                    for source in &answer.sources {
                        println!("  {source:?}");
                    }
                }
            }
            Ok(())
        }
        Err(e) => {
            if let Some(core_err) = e.downcast_ref::<CoreError>() {
                if json {
                    println!("{}", serde_json::json!({ "error": core_err.kind(), "message": core_err.to_string(), "remedy": core_err.remedy() }));
                    return Ok(());
                }
            }
            Err(e)
        }
    }
}

async fn open_store(project_root: &Path) -> anyhow::Result<SqliteStore> {
    SqliteStore::open(&project::db_path(project_root)).await
}

fn model_host_for(config: &paranoid_core::Config) -> OllamaModelHost {
    OllamaModelHost::new(config.ollama_host.clone(), Duration::from_secs(config.model_call_timeout_secs))
}

/// Overlays built-in patterns, configured additional patterns, the root's
/// `.gitignore` (if enabled), and any patterns recorded in the store, in
/// that order.
async fn build_ignore_matcher(project_root: &Path, store: &dyn Store) -> anyhow::Result<IgnoreMatcher> {
    let config = paranoid_core::Config::load(project_root)?;
    let mut matcher = IgnoreMatcher::new();
    for pattern in &config.builtin_patterns {
        matcher.add_line(pattern);
    }
    for pattern in &config.additional_patterns {
        matcher.add_line(pattern);
    }
    if config.use_gitignore {
        let gitignore = project_root.join(".gitignore");
        if let Ok(text) = std::fs::read_to_string(&gitignore) {
            matcher.add_lines(&text);
        }
    }
    let stored = store.list_ignore_patterns().await?;
    matcher.add_patterns(&stored);
    Ok(matcher)
}
