//! Integration tests exercising the analyze → summarize → index → ask
//! pipeline across crate boundaries, against a mocked model host (no real
//! Ollama instance is available in this environment).

use async_trait::async_trait;
use paranoid_core::{Config, CoreResult, IgnoreMatcher};
use paranoid_extractor::{create_parser_pool, Coordinator};
use paranoid_modelhost::{GenerateOptions, GenerateResult, ModelHost};
use paranoid_query::QueryRouter;
use paranoid_store::{graph_api, SqliteStore, Store};
use paranoid_summarizer::{Summarizer, TemplateRegistry};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic stand-in for an Ollama host: `generate` returns text whose
/// length encodes the prompt length (so distinct prompts produce distinct
/// descriptions, which the smart-invalidation test relies on), and
/// `generate_simple` classifies by sniffing the embedded question for the
/// same cues a real classifier model would be prompted to react to.
struct MockModelHost {
    generate_calls: AtomicUsize,
    simple_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl MockModelHost {
    fn new() -> Self {
        Self { generate_calls: AtomicUsize::new(0), simple_calls: AtomicUsize::new(0), embed_calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ModelHost for MockModelHost {
    async fn generate(&self, _model: &str, prompt: &str, _options: GenerateOptions) -> CoreResult<GenerateResult> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenerateResult {
            text: format!("mock description ({} bytes of prompt)", prompt.len()),
            tokens_used: 10,
            model_version: Some("mock-1".to_string()),
            elapsed_ms: 1,
        })
    }

    async fn generate_simple(&self, _model: &str, prompt: &str) -> CoreResult<String> {
        self.simple_calls.fetch_add(1, Ordering::SeqCst);
        let lower = prompt.to_lowercase();
        let label = if lower.contains("called from") {
            "USAGE"
        } else if lower.contains("what is") || lower.contains("where is") {
            "DEFINITION"
        } else {
            "EXPLANATION"
        };
        Ok(label.to_string())
    }

    async fn embed(&self, _model: &str, text: &str) -> CoreResult<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![text.len() as f32, 1.0])
    }
}

fn ignore_matcher() -> IgnoreMatcher {
    let mut matcher = IgnoreMatcher::new();
    for pattern in &Config::default().builtin_patterns {
        matcher.add_line(pattern);
    }
    matcher
}

#[tokio::test]
async fn analyze_resolves_a_method_call_to_its_definition() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("models.py"),
        "class User:\n    def login(self, password):\n        return password == 'secret'\n\ndef authenticate(user):\n    return user.login('secret')\n",
    )
    .unwrap();

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let coordinator = Coordinator::new(store.clone(), create_parser_pool());
    let outcome = coordinator.analyze_tree(dir.path(), &ignore_matcher(), false).await.unwrap();
    assert_eq!(outcome.failed(), 0);

    let logins = store.get_entities_by_qualified_name("User.login").await.unwrap();
    assert_eq!(logins.len(), 1);

    let callers = graph_api::get_callers(store.as_ref(), logins[0].id).await.unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].entity.as_ref().unwrap().qualified_name, "authenticate");
}

#[tokio::test]
async fn summarize_twice_without_changes_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.py"), "def greet():\n    return 'hi'\n").unwrap();

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    Coordinator::new(store.clone(), create_parser_pool()).analyze_tree(dir.path(), &ignore_matcher(), false).await.unwrap();

    let model_host = Arc::new(MockModelHost::new());
    let summarizer = Summarizer::new(store.clone(), model_host.clone(), Config::default(), TemplateRegistry::new());

    let first = summarizer.summarize_tree(dir.path(), &ignore_matcher(), false).await.unwrap();
    assert_eq!(first.failed(), 0);
    assert!(first.summarized() > 0);
    let calls_after_first = model_host.generate_calls.load(Ordering::SeqCst);

    let second = summarizer.summarize_tree(dir.path(), &ignore_matcher(), false).await.unwrap();
    assert_eq!(second.failed(), 0);
    assert_eq!(second.summarized(), 0, "an unchanged tree should skip every path on the second pass");
    assert_eq!(model_host.generate_calls.load(Ordering::SeqCst), calls_after_first);
}

#[tokio::test]
async fn caller_drift_in_a_sibling_file_re_triggers_summarization() {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("a.py");
    let b_path = dir.path().join("b.py");
    std::fs::write(&a_path, "def target():\n    return 1\n").unwrap();
    std::fs::write(&b_path, "def caller():\n    pass\n").unwrap();

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let extractor = Coordinator::new(store.clone(), create_parser_pool());
    extractor.analyze_tree(dir.path(), &ignore_matcher(), false).await.unwrap();

    let model_host = Arc::new(MockModelHost::new());
    let summarizer = Summarizer::new(store.clone(), model_host.clone(), Config::default(), TemplateRegistry::new());
    summarizer.summarize_tree(dir.path(), &ignore_matcher(), false).await.unwrap();

    let a_summary_before = store.get_summary(&a_path).await.unwrap().unwrap();

    // a.py is untouched, but b.py now calls target() five times — past the
    // default caller-count drift threshold of 3.
    std::fs::write(&b_path, "def caller():\n    target()\n    target()\n    target()\n    target()\n    target()\n").unwrap();
    extractor.analyze_tree(dir.path(), &ignore_matcher(), false).await.unwrap();
    summarizer.summarize_tree(dir.path(), &ignore_matcher(), false).await.unwrap();

    let a_summary_after = store.get_summary(&a_path).await.unwrap().unwrap();
    assert_eq!(a_summary_before.hash, a_summary_after.hash, "a.py's own content never changed");
    assert_ne!(
        a_summary_before.description, a_summary_after.description,
        "a.py should have been re-summarized once its caller count drifted past the threshold"
    );
}

#[tokio::test]
async fn ask_usage_question_resolves_via_graph_without_calling_generate() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("models.py"),
        "class User:\n    def login(self, password):\n        return password == 'secret'\n\ndef authenticate(user):\n    return user.login('secret')\n",
    )
    .unwrap();

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    Coordinator::new(store.clone(), create_parser_pool()).analyze_tree(dir.path(), &ignore_matcher(), false).await.unwrap();

    let model_host = Arc::new(MockModelHost::new());
    let router = QueryRouter::new(store, model_host.clone(), "mock-classifier", "mock-generate", "mock-embed");

    let answer = router.ask("where is `User.login` called from?", false).await.unwrap();
    assert!(!answer.used_generation);
    assert_eq!(model_host.generate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(answer.sources.len(), 1);
}

#[tokio::test]
async fn ask_explanation_question_falls_back_to_retrieval() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let path = Path::new("/p/src/a.py");
    let now = chrono::Utc::now();
    store
        .upsert_summary(&paranoid_core::Summary {
            path: path.to_path_buf(),
            kind: paranoid_core::SummaryKind::File,
            hash: "h1".to_string(),
            description: "Defines a handful of arithmetic helpers.".to_string(),
            extension: Some("py".to_string()),
            language: Some("python".to_string()),
            error: None,
            needs_update: false,
            model: "mock-generate".to_string(),
            model_version: None,
            prompt_version: 1,
            context_level: paranoid_core::ContextLevel::Isolated,
            generated_at: now,
            updated_at: now,
            tokens_used: None,
            generation_time_ms: None,
        })
        .await
        .unwrap();
    store
        .put_vector(&paranoid_core::Vector {
            kind: paranoid_core::VectorKind::Summary,
            object_id: path.to_string_lossy().to_string(),
            embedding: vec![1.0, 0.0],
            model: "mock-embed".to_string(),
            source_hash: "h1".to_string(),
        })
        .await
        .unwrap();

    let model_host = Arc::new(MockModelHost::new());
    let router = QueryRouter::new(store, model_host.clone(), "mock-classifier", "mock-generate", "mock-embed");

    let answer = router.ask("how does this project work overall?", false).await.unwrap();
    assert!(answer.used_generation);
    assert_eq!(model_host.generate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(model_host.embed_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ask_explanation_sorts_sources_across_summaries_and_entities_by_similarity() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let question = "how does this project work overall?";
    let query_embedding = vec![question.len() as f32, 1.0];

    let summary_path = Path::new("/p/src/a.py");
    let now = chrono::Utc::now();
    store
        .upsert_summary(&paranoid_core::Summary {
            path: summary_path.to_path_buf(),
            kind: paranoid_core::SummaryKind::File,
            hash: "h1".to_string(),
            description: "Defines a handful of arithmetic helpers.".to_string(),
            extension: Some("py".to_string()),
            language: Some("python".to_string()),
            error: None,
            needs_update: false,
            model: "mock-generate".to_string(),
            model_version: None,
            prompt_version: 1,
            context_level: paranoid_core::ContextLevel::Isolated,
            generated_at: now,
            updated_at: now,
            tokens_used: None,
            generation_time_ms: None,
        })
        .await
        .unwrap();
    // Orthogonal to the query embedding, so cosine similarity is exactly 0 —
    // the lowest-ranked of the two hits regardless of the query's length.
    store
        .put_vector(&paranoid_core::Vector {
            kind: paranoid_core::VectorKind::Summary,
            object_id: summary_path.to_string_lossy().to_string(),
            embedding: vec![1.0, -query_embedding[0]],
            model: "mock-embed".to_string(),
            source_hash: "h1".to_string(),
        })
        .await
        .unwrap();

    let entity_path = Path::new("/p/src/b.py");
    let entity = paranoid_core::Entity {
        id: paranoid_core::EntityId::derive(entity_path, "helper"),
        file_path: entity_path.to_path_buf(),
        kind: paranoid_core::EntityKind::Function,
        name: "helper".to_string(),
        qualified_name: "helper".to_string(),
        parent_entity: None,
        start_line: 1,
        end_line: 2,
        docstring: Some("Does the real work.".to_string()),
        signature: None,
        language: "python".to_string(),
    };
    store.put_entities_for_file(entity_path, std::slice::from_ref(&entity)).await.unwrap();
    // Identical to the query embedding, so cosine similarity is exactly 1 —
    // this must outrank the summary hit even though entity hits are merged
    // into the result list second.
    store
        .put_vector(&paranoid_core::Vector {
            kind: paranoid_core::VectorKind::Entity,
            object_id: entity.id.0.to_string(),
            embedding: query_embedding.clone(),
            model: "mock-embed".to_string(),
            source_hash: "h2".to_string(),
        })
        .await
        .unwrap();

    let model_host = Arc::new(MockModelHost::new());
    let router = QueryRouter::new(store, model_host, "mock-classifier", "mock-generate", "mock-embed");

    let answer = router.ask(question, false).await.unwrap();
    assert_eq!(answer.sources.len(), 2);
    let similarities: Vec<f32> = answer
        .sources
        .iter()
        .map(|s| match s {
            paranoid_query::AnswerSource::Retrieved { similarity, .. } => *similarity,
            _ => panic!("expected retrieved sources"),
        })
        .collect();
    assert!(
        similarities.windows(2).all(|w| w[0] >= w[1]),
        "sources should be sorted descending by similarity, got {similarities:?}"
    );
    assert!(similarities[0] > similarities[1], "the entity hit should outrank the orthogonal summary hit");
}

#[tokio::test]
async fn ask_explanation_fails_fast_on_an_empty_index() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let model_host = Arc::new(MockModelHost::new());
    let router = QueryRouter::new(store, model_host, "mock-classifier", "mock-generate", "mock-embed");

    let err = router.ask("how does this project work overall?", false).await.unwrap_err();
    let core_err = err.downcast_ref::<paranoid_core::CoreError>().expect("expected a CoreError");
    assert!(matches!(core_err, paranoid_core::CoreError::IndexEmpty));
}
