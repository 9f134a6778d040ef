//! paranoid-store — the per-project persistent store (component C) and
//! the Graph API built on top of it (component H).

pub mod graph_api;
pub mod lookup;
pub mod migrations;
pub mod sqlite;
pub mod traits;

pub use lookup::StoreLookup;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreStats, VectorMatch};

#[cfg(test)]
mod tests {
    use super::*;
    use paranoid_core::{
        ContextLevel, Entity, EntityId, EntityKind, IgnorePattern, IgnorePatternSource,
        Relationship, RelationshipId, RelationshipKind, Summary, SummaryContext, SummaryKind,
        Vector, VectorKind,
    };
    use std::path::PathBuf;

    fn summary(path: &str, hash: &str) -> Summary {
        let now = chrono::Utc::now();
        Summary {
            path: PathBuf::from(path),
            kind: SummaryKind::File,
            hash: hash.to_string(),
            description: format!("S({path})"),
            extension: Some("py".to_string()),
            language: Some("python".to_string()),
            error: None,
            needs_update: false,
            model: "llama3".to_string(),
            model_version: None,
            prompt_version: 1,
            context_level: ContextLevel::Isolated,
            generated_at: now,
            updated_at: now,
            tokens_used: None,
            generation_time_ms: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let s = summary("/p/src/a.py", "h1");
        store.upsert_summary(&s).await.unwrap();
        let fetched = store.get_summary(&s.path).await.unwrap().unwrap();
        assert_eq!(fetched.hash, "h1");
        assert_eq!(fetched.description, "S(/p/src/a.py)");
    }

    #[tokio::test]
    async fn list_children_returns_only_direct_children() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.upsert_summary(&summary("/p/src/a.py", "h1")).await.unwrap();
        store.upsert_summary(&summary("/p/src/utils/b.py", "h2")).await.unwrap();
        store.upsert_summary(&summary("/p/src", "tree")).await.unwrap();

        let children = store.list_children(&PathBuf::from("/p/src")).await.unwrap();
        let paths: Vec<_> = children.iter().map(|s| s.path.to_string_lossy().to_string()).collect();
        assert_eq!(paths, vec!["/p/src/a.py".to_string()]);
    }

    #[tokio::test]
    async fn cascading_delete_removes_entities_relationships_and_vectors() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let file = PathBuf::from("/p/src/a.py");
        store.upsert_summary(&summary("/p/src/a.py", "h1")).await.unwrap();

        let entity = Entity {
            id: EntityId::derive(&file, "authenticate"),
            file_path: file.clone(),
            kind: EntityKind::Function,
            name: "authenticate".to_string(),
            qualified_name: "authenticate".to_string(),
            parent_entity: None,
            start_line: 1,
            end_line: 5,
            docstring: None,
            signature: Some("()".to_string()),
            language: "python".to_string(),
        };
        store.put_entities_for_file(&file, &[entity.clone()]).await.unwrap();

        let rel = Relationship {
            id: RelationshipId(1),
            from_entity: Some(entity.id),
            to_entity: Some(entity.id),
            from_file: file.clone(),
            to_file: None,
            kind: RelationshipKind::Calls,
            location: "/p/src/a.py:3".to_string(),
        };
        store.put_relationships(&file, &[rel]).await.unwrap();

        store
            .put_vector(&Vector {
                kind: VectorKind::Summary,
                object_id: "/p/src/a.py".to_string(),
                embedding: vec![1.0, 0.0],
                model: "nomic-embed-text".to_string(),
                source_hash: "h1".to_string(),
            })
            .await
            .unwrap();
        store
            .put_vector(&Vector {
                kind: VectorKind::Entity,
                object_id: entity.id.0.to_string(),
                embedding: vec![0.0, 1.0],
                model: "nomic-embed-text".to_string(),
                source_hash: "h1".to_string(),
            })
            .await
            .unwrap();

        store.set_analysis_hash(&file, "h1").await.unwrap();
        store
            .set_summary_context(&SummaryContext {
                path: file.clone(),
                imports_hash: "x".to_string(),
                callers_count: 1,
                callees_count: 1,
                context_version: 1,
            })
            .await
            .unwrap();

        store.delete_summary(&file).await.unwrap();

        assert!(store.get_summary(&file).await.unwrap().is_none());
        assert!(store.get_entity_by_id(entity.id).await.unwrap().is_none());
        assert!(store.callers_of(entity.id).await.unwrap().is_empty());
        assert!(store.get_analysis_hash(&file).await.unwrap().is_none());
        assert!(store.get_summary_context(&file).await.unwrap().is_none());
        assert!(store.vector_for(VectorKind::Summary, "/p/src/a.py").await.unwrap().is_none());
        assert!(store.vector_for(VectorKind::Entity, &entity.id.0.to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nearest_returns_closest_vectors_sorted_descending() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        for (id, vec) in [("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0]), ("c", vec![0.9, 0.1])] {
            store
                .put_vector(&Vector {
                    kind: VectorKind::Summary,
                    object_id: id.to_string(),
                    embedding: vec,
                    model: "m".to_string(),
                    source_hash: "h".to_string(),
                })
                .await
                .unwrap();
        }

        let results = store.nearest(VectorKind::Summary, &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].object_id, "a");
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[tokio::test]
    async fn find_definition_falls_back_from_qualified_to_simple_name() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let file = PathBuf::from("/p/src/a.py");
        let entity = Entity {
            id: EntityId::derive(&file, "User.login"),
            file_path: file.clone(),
            kind: EntityKind::Method,
            name: "login".to_string(),
            qualified_name: "User.login".to_string(),
            parent_entity: None,
            start_line: 1,
            end_line: 2,
            docstring: None,
            signature: None,
            language: "python".to_string(),
        };
        store.put_entities_for_file(&file, &[entity.clone()]).await.unwrap();

        let by_qualified = graph_api::find_definition(&store, "User.login").await.unwrap();
        assert_eq!(by_qualified.len(), 1);

        let by_simple = graph_api::find_definition(&store, "login").await.unwrap();
        assert_eq!(by_simple.len(), 1);
    }

    #[tokio::test]
    async fn migrations_are_idempotent_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("summaries.db");
        {
            let store = SqliteStore::open(&db_path).await.unwrap();
            store.upsert_summary(&summary("/p/a.py", "h1")).await.unwrap();
        }
        let store = SqliteStore::open(&db_path).await.unwrap();
        let fetched = store.get_summary(&PathBuf::from("/p/a.py")).await.unwrap().unwrap();
        assert_eq!(fetched.hash, "h1");
    }

    #[tokio::test]
    async fn ignore_patterns_are_append_only_and_listed_in_order() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .add_ignore_pattern(&IgnorePattern {
                pattern: "*.pyc".to_string(),
                added_at: chrono::Utc::now(),
                source: IgnorePatternSource::File,
            })
            .await
            .unwrap();
        let patterns = store.list_ignore_patterns().await.unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern, "*.pyc");
    }
}
