//! Per-object-kind staleness detection (§4.F): a vector is stale if it is
//! missing, was embedded with a different model, its source content has
//! changed since it was written, or the caller asked for a full rebuild.

use paranoid_core::VectorKind;
use paranoid_store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Incremental,
    Full,
}

/// `true` if the object identified by `(kind, object_id, current_hash)`
/// needs to be (re-)embedded.
pub async fn is_stale(
    store: &dyn Store,
    kind: VectorKind,
    object_id: &str,
    current_hash: &str,
    model: &str,
    mode: IndexMode,
) -> anyhow::Result<bool> {
    if mode == IndexMode::Full {
        return Ok(true);
    }
    let Some(existing) = store.vector_for(kind, object_id).await? else {
        return Ok(true);
    };
    Ok(existing.model != model || existing.source_hash != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paranoid_store::SqliteStore;

    #[tokio::test]
    async fn full_mode_is_always_stale() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let stale = is_stale(&store, VectorKind::Summary, "a", "h1", "m", IndexMode::Full).await.unwrap();
        assert!(stale);
    }

    #[tokio::test]
    async fn incremental_mode_is_stale_when_no_vector_exists() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let stale = is_stale(&store, VectorKind::Summary, "a", "h1", "m", IndexMode::Incremental).await.unwrap();
        assert!(stale);
    }

    #[tokio::test]
    async fn incremental_mode_is_fresh_when_hash_and_model_match() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .put_vector(&paranoid_core::Vector {
                kind: VectorKind::Summary,
                object_id: "a".to_string(),
                embedding: vec![1.0],
                model: "m".to_string(),
                source_hash: "h1".to_string(),
            })
            .await
            .unwrap();
        let stale = is_stale(&store, VectorKind::Summary, "a", "h1", "m", IndexMode::Incremental).await.unwrap();
        assert!(!stale);
    }

    #[tokio::test]
    async fn incremental_mode_is_stale_when_model_differs() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .put_vector(&paranoid_core::Vector {
                kind: VectorKind::Summary,
                object_id: "a".to_string(),
                embedding: vec![1.0],
                model: "old-model".to_string(),
                source_hash: "h1".to_string(),
            })
            .await
            .unwrap();
        let stale = is_stale(&store, VectorKind::Summary, "a", "h1", "new-model", IndexMode::Incremental).await.unwrap();
        assert!(stale);
    }

    #[tokio::test]
    async fn incremental_mode_is_stale_when_source_hash_differs() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .put_vector(&paranoid_core::Vector {
                kind: VectorKind::Summary,
                object_id: "a".to_string(),
                embedding: vec![1.0],
                model: "m".to_string(),
                source_hash: "h1".to_string(),
            })
            .await
            .unwrap();
        let stale = is_stale(&store, VectorKind::Summary, "a", "h2", "m", IndexMode::Incremental).await.unwrap();
        assert!(stale);
    }
}
