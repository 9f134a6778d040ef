//! Hand-rolled gitignore-style glob matching (component B).
//!
//! The concrete parser that turns an ignore *file* into a pattern list is an
//! external collaborator; this module owns the matching algorithm itself —
//! `*`, `**`, `?`, `[...]`, leading `!` negation, a trailing `/` restricting
//! the pattern to directories, `#` comments, and blank lines.

use crate::model::{IgnorePattern, IgnorePatternSource};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CompiledPattern {
    negated: bool,
    dir_only: bool,
    /// Anchored to the project root (pattern contained a `/` other than a
    /// trailing one) vs. matched against every path segment.
    anchored: bool,
    segments: Vec<String>,
}

/// Matches paths relative to a project root against built-in, `.gitignore`
/// / `.paranoidignore`, and configured additional patterns, in that overlay
/// order — later patterns (and `!`-negations) win.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<CompiledPattern>,
}

impl IgnoreMatcher {
    pub fn new() -> Self {
        IgnoreMatcher { patterns: Vec::new() }
    }

    /// Parse one pattern line (as it would appear in a `.gitignore` file or
    /// be passed via `additional_patterns`). Comments and blank lines
    /// compile to nothing.
    pub fn add_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        self.patterns.push(compile(line));
    }

    pub fn add_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    pub fn add_patterns(&mut self, patterns: &[IgnorePattern]) {
        for p in patterns {
            if matches!(p.source, IgnorePatternSource::File | IgnorePatternSource::Command) {
                self.add_line(&p.pattern);
            }
        }
    }

    /// `true` if `relative_path` (relative to the project root, using `/`
    /// separators) should be excluded. The last matching pattern wins,
    /// matching gitignore precedence.
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        let path_str = relative_path.to_string_lossy().replace('\\', "/");
        let segments: Vec<&str> = path_str.split('/').filter(|s| !s.is_empty()).collect();

        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.dir_only && !is_dir {
                continue;
            }
            if pattern_matches(pattern, &segments) {
                ignored = !pattern.negated;
            }
        }
        ignored
    }
}

fn compile(raw: &str) -> CompiledPattern {
    let negated = raw.starts_with('!');
    let mut pattern = if negated { &raw[1..] } else { raw };

    let dir_only = pattern.ends_with('/') && pattern.len() > 1;
    if dir_only {
        pattern = &pattern[..pattern.len() - 1];
    }

    let anchored = pattern.trim_start_matches('/').contains('/');
    let pattern = pattern.trim_start_matches('/');

    let segments = pattern.split('/').map(|s| s.to_string()).collect();

    CompiledPattern { negated, dir_only, anchored, segments }
}

fn pattern_matches(pattern: &CompiledPattern, path_segments: &[&str]) -> bool {
    if pattern.anchored || pattern.segments.len() > 1 {
        return match_segments(&pattern.segments, path_segments);
    }

    // Unanchored single-segment pattern: matches if any path segment (or any
    // suffix window of segments, to support it matching at any depth).
    for start in 0..path_segments.len() {
        if match_segments(&pattern.segments, &path_segments[start..]) {
            return true;
        }
    }
    false
}

/// Match a pattern's `/`-split segments (which may contain a `**` segment)
/// against a candidate path's segments.
fn match_segments(pattern: &[String], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((head, rest)) if head == "**" => {
            if rest.is_empty() {
                return true;
            }
            for start in 0..=path.len() {
                if match_segments(rest, &path[start..]) {
                    return true;
                }
            }
            false
        }
        Some((head, rest)) => match path.split_first() {
            Some((first, path_rest)) if glob_segment_matches(head, first) => {
                match_segments(rest, path_rest)
            }
            _ => false,
        },
    }
}

/// Match a single path segment against a single glob segment supporting
/// `*`, `?`, and `[...]` character classes.
fn glob_segment_matches(glob: &str, segment: &str) -> bool {
    fn inner(glob: &[char], segment: &[char]) -> bool {
        match glob.split_first() {
            None => segment.is_empty(),
            Some(('*', rest)) => {
                for start in 0..=segment.len() {
                    if inner(rest, &segment[start..]) {
                        return true;
                    }
                }
                false
            }
            Some(('?', rest)) => match segment.split_first() {
                Some((_, seg_rest)) => inner(rest, seg_rest),
                None => false,
            },
            Some(('[', rest)) => {
                let Some(close) = rest.iter().position(|&c| c == ']') else {
                    return false;
                };
                let class = &rest[..close];
                let after_class = &rest[close + 1..];
                match segment.split_first() {
                    Some((c, seg_rest)) if char_class_matches(class, *c) => inner(after_class, seg_rest),
                    _ => false,
                }
            }
            Some((c, rest)) => match segment.split_first() {
                Some((sc, seg_rest)) if sc == c => inner(rest, seg_rest),
                _ => false,
            },
        }
    }

    let glob_chars: Vec<char> = glob.chars().collect();
    let segment_chars: Vec<char> = segment.chars().collect();
    inner(&glob_chars, &segment_chars)
}

fn char_class_matches(class: &[char], c: char) -> bool {
    let (negate, class) = match class.split_first() {
        Some(('!', rest)) => (true, rest),
        Some(('^', rest)) => (true, rest),
        _ => (false, class),
    };

    let mut matched = false;
    let mut i = 0;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == '-' {
            if class[i] <= c && c <= class[i + 2] {
                matched = true;
            }
            i += 3;
        } else {
            if class[i] == c {
                matched = true;
            }
            i += 1;
        }
    }

    matched != negate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ignored(matcher: &IgnoreMatcher, path: &str, is_dir: bool) -> bool {
        matcher.is_ignored(&PathBuf::from(path), is_dir)
    }

    #[test]
    fn simple_name_matches_at_any_depth() {
        let mut m = IgnoreMatcher::new();
        m.add_line("*.pyc");
        assert!(ignored(&m, "a.pyc", false));
        assert!(ignored(&m, "src/a.pyc", false));
        assert!(!ignored(&m, "src/a.py", false));
    }

    #[test]
    fn dir_only_pattern_does_not_match_files() {
        let mut m = IgnoreMatcher::new();
        m.add_line("build/");
        assert!(ignored(&m, "build", true));
        assert!(!ignored(&m, "build", false));
    }

    #[test]
    fn anchored_pattern_only_matches_at_root() {
        let mut m = IgnoreMatcher::new();
        m.add_line("/target");
        assert!(ignored(&m, "target", true));
        assert!(!ignored(&m, "src/target", true));
    }

    #[test]
    fn double_star_matches_zero_or_more_segments() {
        let mut m = IgnoreMatcher::new();
        m.add_line("**/node_modules");
        assert!(ignored(&m, "node_modules", true));
        assert!(ignored(&m, "a/b/node_modules", true));
    }

    #[test]
    fn negation_reinstates_a_previously_ignored_path() {
        let mut m = IgnoreMatcher::new();
        m.add_line("*.log");
        m.add_line("!important.log");
        assert!(ignored(&m, "debug.log", false));
        assert!(!ignored(&m, "important.log", false));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let mut m = IgnoreMatcher::new();
        m.add_lines("# a comment\n\n*.tmp\n");
        assert!(ignored(&m, "x.tmp", false));
        assert_eq!(m.patterns.len(), 1);
    }

    #[test]
    fn character_class_matches_a_range() {
        let mut m = IgnoreMatcher::new();
        m.add_line("file[0-9].txt");
        assert!(ignored(&m, "file3.txt", false));
        assert!(!ignored(&m, "fileA.txt", false));
    }

    #[test]
    fn question_mark_matches_exactly_one_character() {
        let mut m = IgnoreMatcher::new();
        m.add_line("a?.rs");
        assert!(ignored(&m, "ab.rs", false));
        assert!(!ignored(&m, "abc.rs", false));
    }
}
