//! Prompt templates (§4.E) — one built-in template per [`SummaryKind`], with
//! optional per-language overrides loaded from a project's
//! `.paranoid-coder/prompts.json`. An override missing a required
//! placeholder fails to load rather than silently producing a broken prompt.

use paranoid_core::{CoreError, CoreResult, SummaryKind};
use std::collections::HashMap;
use std::path::Path;

pub const FILE_PLACEHOLDERS: &[&str] = &["{filename}", "{content}", "{existing}", "{length}", "{extension}"];
pub const DIR_PLACEHOLDERS: &[&str] = &["{dir_path}", "{children}", "{existing}", "{n_paragraphs}"];

const DEFAULT_FILE_TEMPLATE: &str = "\
You are documenting a codebase. Write a {length} description of the \
{extension} file `{filename}`.

Previous description (if any, for continuity): {existing}

File content:
{content}
";

const DEFAULT_DIR_TEMPLATE: &str = "\
You are documenting a codebase. Write a description of the directory \
`{dir_path}` in about {n_paragraphs} paragraph(s), summarizing what its \
contents do as a unit.

Previous description (if any, for continuity): {existing}

Children:
{children}
";

/// Built-in defaults plus any project-level overrides, keyed `{language}:file`
/// / `{language}:directory`.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    overrides: HashMap<String, String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` (a JSON object of `"<language>:file"` / `"<language>:directory"`
    /// → template string) if it exists. A missing file is not an error; a
    /// template missing a required placeholder is.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let mut registry = Self::new();
        if !path.exists() {
            return Ok(registry);
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| CoreError::IoError { path: path.to_path_buf(), source })?;
        let raw: HashMap<String, String> = serde_json::from_str(&text).unwrap_or_default();
        for (key, template) in raw {
            let required = if key.ends_with(":directory") { DIR_PLACEHOLDERS } else { FILE_PLACEHOLDERS };
            validate(&key, &template, required)?;
            registry.overrides.insert(key, template);
        }
        Ok(registry)
    }

    pub fn file_template(&self, language: &str) -> &str {
        self.overrides.get(&format!("{language}:file")).map(String::as_str).unwrap_or(DEFAULT_FILE_TEMPLATE)
    }

    pub fn directory_template(&self) -> &str {
        self.overrides.get("directory:directory").map(String::as_str).unwrap_or(DEFAULT_DIR_TEMPLATE)
    }

    pub fn template_for(&self, language: &str, kind: SummaryKind) -> &str {
        match kind {
            SummaryKind::File => self.file_template(language),
            SummaryKind::Directory => self.directory_template(),
        }
    }
}

fn validate(key: &str, template: &str, required: &[&str]) -> CoreResult<()> {
    let missing: Vec<&str> = required.iter().filter(|p| !template.contains(*p)).copied().collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidTemplate { key: key.to_string(), missing: missing.join(", ") })
    }
}

pub fn render_file_prompt(
    template: &str,
    filename: &str,
    content: &str,
    existing: &str,
    length: &str,
    extension: &str,
) -> String {
    template
        .replace("{filename}", filename)
        .replace("{content}", content)
        .replace("{existing}", existing)
        .replace("{length}", length)
        .replace("{extension}", extension)
}

pub fn render_dir_prompt(template: &str, dir_path: &str, children: &str, existing: &str, n_paragraphs: u32) -> String {
    template
        .replace("{dir_path}", dir_path)
        .replace("{children}", children)
        .replace("{existing}", existing)
        .replace("{n_paragraphs}", &n_paragraphs.to_string())
}

/// Deterministic, monotonic length bucket from a file's byte length.
/// Boundaries sit exactly at 2^15 and 2^16 bytes so files of precisely that
/// size land in the lower bucket.
pub fn length_bucket(byte_len: usize) -> &'static str {
    const SHORT_MAX: usize = 1 << 15;
    const MEDIUM_MAX: usize = 1 << 16;
    if byte_len <= SHORT_MAX {
        "short"
    } else if byte_len <= MEDIUM_MAX {
        "medium"
    } else {
        "long"
    }
}

/// How many paragraphs to ask for in a directory summary, scaled to how many
/// children it has.
pub fn paragraph_count(child_count: usize) -> u32 {
    if child_count <= 5 {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_satisfy_their_own_placeholder_requirements() {
        for p in FILE_PLACEHOLDERS {
            assert!(DEFAULT_FILE_TEMPLATE.contains(p), "missing {p} in file template");
        }
        for p in DIR_PLACEHOLDERS {
            assert!(DEFAULT_DIR_TEMPLATE.contains(p), "missing {p} in directory template");
        }
    }

    #[test]
    fn load_from_missing_path_returns_defaults() {
        let registry = TemplateRegistry::load(Path::new("/nonexistent/prompts.json")).unwrap();
        assert_eq!(registry.file_template("python"), DEFAULT_FILE_TEMPLATE);
    }

    #[test]
    fn load_rejects_a_template_missing_a_required_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.json");
        std::fs::write(&path, r#"{"python:file": "no placeholders here"}"#).unwrap();
        let err = TemplateRegistry::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTemplate { .. }));
    }

    #[test]
    fn load_accepts_a_valid_override_and_prefers_it_over_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.json");
        let template = "{filename} {content} {existing} {length} {extension}";
        std::fs::write(&path, serde_json::json!({ "python:file": template }).to_string()).unwrap();
        let registry = TemplateRegistry::load(&path).unwrap();
        assert_eq!(registry.file_template("python"), template);
        assert_eq!(registry.file_template("go"), DEFAULT_FILE_TEMPLATE);
    }

    #[test]
    fn length_bucket_boundaries_are_inclusive_on_the_low_side() {
        assert_eq!(length_bucket(32768), "short");
        assert_eq!(length_bucket(32769), "medium");
        assert_eq!(length_bucket(65536), "medium");
        assert_eq!(length_bucket(65537), "long");
    }
}
