//! Merged configuration: built-in defaults → global config → project config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_model: String,
    pub default_embedding_model: String,
    pub default_classifier_model: String,
    /// URL of the local model host, e.g. `http://localhost:11434`.
    pub ollama_host: String,
    pub default_context_level: u8,
    pub callers_threshold: u32,
    pub callees_threshold: u32,
    pub re_summarize_on_imports_change: bool,
    pub use_gitignore: bool,
    pub builtin_patterns: Vec<String>,
    pub additional_patterns: Vec<String>,
    pub log_level: String,
    pub model_call_timeout_secs: u64,
    pub worker_pool_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_model: "llama3".to_string(),
            default_embedding_model: "nomic-embed-text".to_string(),
            default_classifier_model: "llama3".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            default_context_level: 1,
            callers_threshold: 3,
            callees_threshold: 3,
            re_summarize_on_imports_change: true,
            use_gitignore: true,
            builtin_patterns: vec![".paranoid-coder/".to_string(), ".git/".to_string()],
            additional_patterns: Vec::new(),
            log_level: "info".to_string(),
            model_call_timeout_secs: 60,
            worker_pool_size: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl Config {
    /// Merge built-in defaults, `~/.paranoid/config.json`, and
    /// `<root>/.paranoid-coder/config.json`, in that order. Missing files at
    /// either layer are not an error.
    pub fn load(project_root: &Path) -> anyhow::Result<Config> {
        let mut config = Config::default();

        if let Some(home) = dirs_home() {
            let global_path = home.join(".paranoid").join("config.json");
            config.merge_from_file(&global_path)?;
        }

        let project_path = project_root.join(".paranoid-coder").join("config.json");
        config.merge_from_file(&project_path)?;

        Ok(config)
    }

    fn merge_from_file(&mut self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path)?;
        let overrides: serde_json::Value = serde_json::from_str(&text)?;
        let mut base = serde_json::to_value(&*self)?;
        merge_json(&mut base, overrides);
        *self = serde_json::from_value(base)?;
        Ok(())
    }
}

/// Shallow-merge `b` over `a` for objects; scalars and arrays are replaced
/// wholesale rather than combined.
fn merge_json(a: &mut serde_json::Value, b: serde_json::Value) {
    match (a, b) {
        (serde_json::Value::Object(a), serde_json::Value::Object(b)) => {
            for (key, value) in b {
                merge_json(a.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (a, b) => *a = b,
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_thresholds() {
        let config = Config::default();
        assert_eq!(config.callers_threshold, 3);
        assert!(config.use_gitignore);
    }

    #[test]
    fn merge_from_missing_file_is_a_no_op() {
        let mut config = Config::default();
        let before = config.clone();
        config.merge_from_file(Path::new("/nonexistent/config.json")).unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn merge_from_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"callers_threshold": 9}"#).unwrap();

        let mut config = Config::default();
        config.merge_from_file(&path).unwrap();

        assert_eq!(config.callers_threshold, 9);
        assert_eq!(config.callees_threshold, Config::default().callees_threshold);
    }
}
