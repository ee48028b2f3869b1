//! Path exclusion matchers.
//!
//! The scanner only needs a predicate over root-relative path strings, so
//! any pattern syntax can be plugged in through [`PathMatcher`].

use globset::{Glob, GlobMatcher as CompiledGlob};
use regex::Regex;

use crate::error::SyncError;

/// Decides whether a root-relative path is excluded.
///
/// The root itself is tested as the empty string.
pub trait PathMatcher: Send + Sync {
    /// Returns `true` if `rel_path` should be pruned.
    fn is_match(&self, rel_path: &str) -> bool;
}

impl<F> PathMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, rel_path: &str) -> bool {
        self(rel_path)
    }
}

/// Regular expression searched anywhere in the relative path (unanchored).
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compile a regular expression.
    pub fn new(pattern: &str) -> Result<Self, SyncError> {
        let regex = Regex::new(pattern).map_err(|e| SyncError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl PathMatcher for RegexMatcher {
    fn is_match(&self, rel_path: &str) -> bool {
        self.regex.is_match(rel_path)
    }
}

/// Shell-style glob matched against the whole relative path.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    glob: CompiledGlob,
}

impl GlobMatcher {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self, SyncError> {
        let glob = Glob::new(pattern).map_err(|e| SyncError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            glob: glob.compile_matcher(),
        })
    }
}

impl PathMatcher for GlobMatcher {
    fn is_match(&self, rel_path: &str) -> bool {
        self.glob.is_match(rel_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_is_unanchored() {
        let matcher = RegexMatcher::new(r"\.git").unwrap();
        assert!(matcher.is_match(".git"));
        assert!(matcher.is_match("sub/.git/config"));
        assert!(!matcher.is_match("src/main.rs"));
    }

    #[test]
    fn test_vcs_exclusion_pattern() {
        let matcher =
            RegexMatcher::new(r"(?:.*?/)?\.(?:(?:svn|git)(?:/.*)?|gitignore)$").unwrap();
        assert!(matcher.is_match(".git"));
        assert!(matcher.is_match("a/.svn/entries"));
        assert!(matcher.is_match("a/.gitignore"));
        assert!(!matcher.is_match("a/git.txt"));
        assert!(!matcher.is_match(""));
    }

    #[test]
    fn test_invalid_regex() {
        let err = RegexMatcher::new("(unclosed").unwrap_err();
        assert!(matches!(err, SyncError::InvalidPattern { .. }));
    }

    #[test]
    fn test_glob_matcher() {
        let matcher = GlobMatcher::new("*.log").unwrap();
        assert!(matcher.is_match("build.log"));
        assert!(matcher.is_match("logs/app.log"));
        assert!(!matcher.is_match("notes.txt"));
    }

    #[test]
    fn test_closure_matcher() {
        let matcher = |p: &str| p.starts_with("tmp");
        assert!(PathMatcher::is_match(&matcher, "tmp/x"));
        assert!(!PathMatcher::is_match(&matcher, "src"));
    }
}
