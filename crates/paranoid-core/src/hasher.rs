//! Content and tree hashing (component A).
//!
//! Both hashes use the same 256-bit digest so a directory's tree hash and a
//! file's content hash are comparable as opaque strings everywhere else in
//! the workspace.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::model::SummaryContext;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Hex digest of a file's raw bytes. Binary-safe.
pub fn content_hash(path: &Path) -> CoreResult<String> {
    let bytes = std::fs::read(path).map_err(|source| CoreError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex_digest(&bytes))
}

/// Hex digest of the sorted concatenation of `child_hashes`.
///
/// Callers are expected to have already filtered `child_hashes` down to
/// children that actually exist in the store; this function is otherwise a
/// pure function of its input, which is what lets a directory's hash change
/// whenever any descendant's hash changes, however deep.
pub fn tree_hash(mut child_hashes: Vec<String>) -> String {
    child_hashes.sort();
    let joined = child_hashes.join("");
    hex_digest(joined.as_bytes())
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// The minimal slice of the Store that `needs_summarization` consults.
/// Implemented by `paranoid-store`'s `Store`; kept as a narrow trait here so
/// `paranoid-core` does not depend on the storage engine.
#[async_trait::async_trait]
pub trait SummarizationLookup: Send + Sync {
    /// `(stored_hash, needs_update)` for the path's current Summary, if any.
    async fn summary_hash(&self, path: &Path) -> CoreResult<Option<(String, bool)>>;

    /// Current smart-invalidation context for the path, if a level-1
    /// Summary exists and its current graph-derived counts are known.
    async fn current_context(&self, path: &Path) -> CoreResult<Option<(SummaryContext, SummaryContext)>>;
}

/// True if `path` should be (re)summarized: no Summary exists, the stored
/// hash differs from `current_hash`, `needs_update` is set, or smart
/// invalidation reports drift for an existing level-1 summary.
pub async fn needs_summarization(
    path: &Path,
    current_hash: &str,
    store: &dyn SummarizationLookup,
    config: &Config,
) -> CoreResult<bool> {
    let Some((stored_hash, needs_update)) = store.summary_hash(path).await? else {
        return Ok(true);
    };
    if needs_update || stored_hash != current_hash {
        return Ok(true);
    }

    if let Some((stored, current)) = store.current_context(path).await? {
        if config.re_summarize_on_imports_change && stored.imports_hash != current.imports_hash {
            return Ok(true);
        }
        let caller_drift = (stored.callers_count as i64 - current.callers_count as i64).unsigned_abs() as u32;
        if caller_drift > config.callers_threshold {
            return Ok(true);
        }
        let callee_drift = (stored.callees_count as i64 - current.callees_count as i64).unsigned_abs() as u32;
        if callee_drift > config.callees_threshold {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn content_hash_is_deterministic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello world").unwrap();
        let a = content_hash(f.path()).unwrap();
        let b = content_hash(f.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn content_hash_fails_on_missing_path() {
        let result = content_hash(Path::new("/does/not/exist/at/all"));
        assert!(matches!(result, Err(CoreError::IoError { .. })));
    }

    #[test]
    fn tree_hash_empty_is_hash_of_empty_concatenation() {
        assert_eq!(tree_hash(vec![]), hex_digest(b""));
    }

    #[test]
    fn tree_hash_is_order_independent() {
        let a = tree_hash(vec!["bbb".into(), "aaa".into()]);
        let b = tree_hash(vec!["aaa".into(), "bbb".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn tree_hash_changes_when_a_child_changes() {
        let before = tree_hash(vec!["aaa".into(), "bbb".into()]);
        let after = tree_hash(vec!["aaa".into(), "ccc".into()]);
        assert_ne!(before, after);
    }

    struct MockStore {
        hash: Option<(String, bool)>,
        contexts: Option<(SummaryContext, SummaryContext)>,
    }

    #[async_trait::async_trait]
    impl SummarizationLookup for MockStore {
        async fn summary_hash(&self, _path: &Path) -> CoreResult<Option<(String, bool)>> {
            Ok(self.hash.clone())
        }
        async fn current_context(&self, _path: &Path) -> CoreResult<Option<(SummaryContext, SummaryContext)>> {
            Ok(self.contexts.clone())
        }
    }

    fn context(callers: u32, callees: u32, imports_hash: &str) -> SummaryContext {
        SummaryContext {
            path: Path::new("x.py").to_path_buf(),
            imports_hash: imports_hash.to_string(),
            callers_count: callers,
            callees_count: callees,
            context_version: 1,
        }
    }

    #[tokio::test]
    async fn needs_summarization_true_when_no_summary_exists() {
        let store = MockStore { hash: None, contexts: None };
        let config = Config::default();
        assert!(needs_summarization(Path::new("x.py"), "h1", &store, &config).await.unwrap());
    }

    #[tokio::test]
    async fn needs_summarization_false_when_hash_matches_and_no_drift() {
        let store = MockStore {
            hash: Some(("h1".to_string(), false)),
            contexts: Some((context(2, 1, "abc"), context(2, 1, "abc"))),
        };
        let config = Config::default();
        assert!(!needs_summarization(Path::new("x.py"), "h1", &store, &config).await.unwrap());
    }

    #[tokio::test]
    async fn needs_summarization_true_on_caller_drift_past_threshold() {
        // scenario 5: 2 callers stored, 7 current, threshold 3 -> drift of 5
        let store = MockStore {
            hash: Some(("h1".to_string(), false)),
            contexts: Some((context(2, 0, "abc"), context(7, 0, "abc"))),
        };
        let mut config = Config::default();
        config.callers_threshold = 3;
        assert!(needs_summarization(Path::new("x.py"), "h1", &store, &config).await.unwrap());
    }

    #[tokio::test]
    async fn needs_summarization_true_when_needs_update_flag_set() {
        let store = MockStore { hash: Some(("h1".to_string(), true)), contexts: None };
        let config = Config::default();
        assert!(needs_summarization(Path::new("x.py"), "h1", &store, &config).await.unwrap());
    }
}
