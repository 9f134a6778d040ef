//! Error taxonomy surfaced to every caller of the core engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the workspace's core crates.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no project found at or above {path}")]
    NoProjectFound { path: PathBuf },

    #[error("{path} is already an initialized project")]
    AlreadyInitialized { path: PathBuf },

    #[error("unsupported language for {path}")]
    UnsupportedLanguage { path: PathBuf },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("io error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model host unreachable at {host}: {message}")]
    ModelHostUnreachable { host: String, message: String },

    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    #[error("model error from {model}: {message}")]
    ModelError { model: String, message: String },

    #[error("vector index is empty")]
    IndexEmpty,

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    SchemaIncompatible { found: u32, supported: u32 },

    #[error("prompt template {key} is missing required placeholder(s): {missing}")]
    InvalidTemplate { key: String, missing: String },

    #[error("prompt for {path} exceeds the model's context window after truncation")]
    ContextOverflow { path: PathBuf },
}

impl CoreError {
    /// A short, user-facing remedy string, surfaced alongside `kind` and
    /// `message` in `--json` output.
    pub fn remedy(&self) -> &'static str {
        match self {
            CoreError::NoProjectFound { .. } => "run `paranoid-coder init` on this directory",
            CoreError::AlreadyInitialized { .. } => "no action needed, init is idempotent",
            CoreError::UnsupportedLanguage { .. } => "file was skipped, no action needed",
            CoreError::ParseError { .. } => "check the file's syntax; extraction continues for other files",
            CoreError::IoError { .. } => "check file permissions and that the path still exists",
            CoreError::ModelHostUnreachable { .. } => "verify `ollama_host` is reachable",
            CoreError::ModelNotFound { .. } => "pull or configure the requested model on the model host",
            CoreError::ModelError { .. } => "check the model host's logs",
            CoreError::IndexEmpty => "run `paranoid-coder index` before asking explanation questions",
            CoreError::SchemaIncompatible { .. } => "upgrade paranoid-coder to open this project",
            CoreError::InvalidTemplate { .. } => "add the missing placeholder(s) to the override template",
            CoreError::ContextOverflow { .. } => "reduce content size or switch to a larger-context model",
        }
    }

    /// The taxonomy name, stable for machine-readable (`--json`) output.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NoProjectFound { .. } => "NoProjectFound",
            CoreError::AlreadyInitialized { .. } => "AlreadyInitialized",
            CoreError::UnsupportedLanguage { .. } => "UnsupportedLanguage",
            CoreError::ParseError { .. } => "ParseError",
            CoreError::IoError { .. } => "IoError",
            CoreError::ModelHostUnreachable { .. } => "ModelHostUnreachable",
            CoreError::ModelNotFound { .. } => "ModelNotFound",
            CoreError::ModelError { .. } => "ModelError",
            CoreError::IndexEmpty => "IndexEmpty",
            CoreError::SchemaIncompatible { .. } => "SchemaIncompatible",
            CoreError::InvalidTemplate { .. } => "InvalidTemplate",
            CoreError::ContextOverflow { .. } => "ContextOverflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remedy_and_kind_are_stable_strings() {
        let err = CoreError::IndexEmpty;
        assert_eq!(err.kind(), "IndexEmpty");
        assert!(!err.remedy().is_empty());
    }
}
