//! Extracts a candidate entity name (`Class.method` or a bare identifier)
//! from a natural-language question, for the USAGE/DEFINITION fast paths.

use regex::Regex;
use std::sync::OnceLock;

fn backtick_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)`").unwrap())
}

fn dotted_identifier_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+").unwrap())
}

/// Common English words a bare-identifier scan would otherwise pick up from
/// ordinary question phrasing.
const STOPWORDS: &[&str] = &[
    "where", "what", "how", "why", "does", "is", "are", "the", "this", "that", "called", "function",
    "method", "class", "used", "from", "who", "calls", "define", "defined", "write", "generate",
];

/// Prefers a backtick-quoted name (`` `User.login` ``), falls back to the
/// first dotted identifier, then the first plausible bare identifier.
pub fn extract_entity_name(question: &str) -> Option<String> {
    if let Some(caps) = backtick_pattern().captures(question) {
        return Some(caps[1].to_string());
    }
    if let Some(m) = dotted_identifier_pattern().find(question) {
        return Some(m.as_str().to_string());
    }
    question
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .find(|word| {
            word.len() > 2
                && word.chars().next().is_some_and(|c| c.is_alphabetic())
                && !STOPWORDS.contains(&word.to_lowercase().as_str())
        })
        .map(str::to_string)
}
