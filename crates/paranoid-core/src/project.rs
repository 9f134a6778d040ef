//! Project root discovery: a project is any directory containing a
//! `.paranoid-coder` subdirectory created by `init`.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

pub const PROJECT_DIR: &str = ".paranoid-coder";
pub const DB_FILE: &str = "summaries.db";
pub const PROJECT_CONFIG_FILE: &str = "config.json";
pub const PROMPT_OVERRIDE_FILE: &str = "prompts.json";

/// Walk parents of `start` until a `.paranoid-coder` directory is found.
pub fn discover_project_root(start: &Path) -> CoreResult<PathBuf> {
    let mut current = start;
    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => {
                return Err(CoreError::NoProjectFound { path: start.to_path_buf() });
            }
        }
    }
}

pub fn project_dir(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR)
}

pub fn db_path(root: &Path) -> PathBuf {
    project_dir(root).join(DB_FILE)
}

/// Create `.paranoid-coder` under `root`. Idempotent: re-initializing an
/// already-initialized root succeeds without touching its contents.
pub fn initialize(root: &Path) -> CoreResult<bool> {
    let dir = project_dir(root);
    if dir.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(&dir).map_err(|source| CoreError::IoError {
        path: dir.clone(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_finds_project_root_from_a_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join(".paranoid-coder")).unwrap();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();

        let found = discover_project_root(&root.join("src/nested")).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn discover_fails_when_no_project_exists() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_project_root(dir.path());
        assert!(matches!(result, Err(CoreError::NoProjectFound { .. })));
    }

    #[test]
    fn initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(initialize(dir.path()).unwrap());
        assert!(!initialize(dir.path()).unwrap());
    }
}
