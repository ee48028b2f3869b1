//! Replication configuration types.

use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::matcher::{GlobMatcher, PathMatcher, RegexMatcher};

/// Syntax used for the exclusion patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSyntax {
    /// Regular expression searched anywhere in the relative path.
    #[default]
    Regex,
    /// Glob matched against the whole relative path.
    Glob,
}

impl PatternSyntax {
    /// Compile `pattern` into a matcher of this syntax.
    pub fn compile(self, pattern: &str) -> Result<Box<dyn PathMatcher>, SyncError> {
        let matcher: Box<dyn PathMatcher> = match self {
            Self::Regex => Box::new(RegexMatcher::new(pattern)?),
            Self::Glob => Box::new(GlobMatcher::new(pattern)?),
        };
        Ok(matcher)
    }
}

/// Configuration for one source → destination replication.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SyncConfig {
    /// Source directory.
    pub source: PathBuf,

    /// Destination directory.
    #[serde(alias = "dest")]
    pub destination: PathBuf,

    /// Report actions without touching the filesystem.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Pattern pruning paths from the source scan.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub exclude_source: Option<String>,

    /// Pattern pruning paths from the destination scan.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub exclude_destination: Option<String>,

    /// Syntax of both exclusion patterns.
    #[builder(default)]
    #[serde(default)]
    pub pattern_syntax: PatternSyntax,
}

impl SyncConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.source {
            Some(ref source) if source.as_os_str().is_empty() => {
                return Err("Source path cannot be empty".to_string());
            }
            None => return Err("Source path is required".to_string()),
            _ => {}
        }
        match self.destination {
            Some(ref destination) if destination.as_os_str().is_empty() => {
                return Err("Destination path cannot be empty".to_string());
            }
            None => return Err("Destination path is required".to_string()),
            _ => {}
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Create a new config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Create a config with defaults for everything but the two roots.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            dry_run: false,
            exclude_source: None,
            exclude_destination: None,
            pattern_syntax: PatternSyntax::Regex,
        }
    }

    /// Compile the source exclusion pattern, if any.
    pub fn source_matcher(&self) -> Result<Option<Box<dyn PathMatcher>>, SyncError> {
        self.exclude_source
            .as_deref()
            .map(|p| self.pattern_syntax.compile(p))
            .transpose()
    }

    /// Compile the destination exclusion pattern, if any.
    pub fn destination_matcher(&self) -> Result<Option<Box<dyn PathMatcher>>, SyncError> {
        self.exclude_destination
            .as_deref()
            .map(|p| self.pattern_syntax.compile(p))
            .transpose()
    }

    /// Check the preconditions the scanner relies on.
    ///
    /// The source must be an existing directory. A missing destination is
    /// created when `create_destination` is set; an existing one must be a
    /// directory.
    pub fn validate_paths(&self, create_destination: bool) -> Result<(), SyncError> {
        require_dir(&self.source)?;

        if !self.destination.exists() && fs::symlink_metadata(&self.destination).is_err() {
            if !create_destination {
                return Err(SyncError::NotFound {
                    path: self.destination.clone(),
                });
            }
            tracing::warn!(
                destination = %self.destination.display(),
                "destination directory not found, creating it"
            );
            fs::create_dir_all(&self.destination)
                .map_err(|e| SyncError::io(&self.destination, e))?;
        }

        require_dir(&self.destination)
    }
}

fn require_dir(path: &Path) -> Result<(), SyncError> {
    let metadata = fs::metadata(path).map_err(|e| SyncError::io(path, e))?;
    if !metadata.is_dir() {
        return Err(SyncError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let config = SyncConfig::builder()
            .source("/src")
            .destination("/dst")
            .dry_run(true)
            .exclude_destination(r"\.git")
            .build()
            .unwrap();

        assert_eq!(config.source, PathBuf::from("/src"));
        assert_eq!(config.destination, PathBuf::from("/dst"));
        assert!(config.dry_run);
        assert!(config.exclude_source.is_none());
        assert_eq!(config.exclude_destination.as_deref(), Some(r"\.git"));
        assert_eq!(config.pattern_syntax, PatternSyntax::Regex);
    }

    #[test]
    fn test_builder_requires_roots() {
        assert!(SyncConfig::builder().source("/src").build().is_err());
        assert!(SyncConfig::builder().source("").destination("/d").build().is_err());
    }

    #[test]
    fn test_matchers() {
        let mut config = SyncConfig::new("/src", "/dst");
        assert!(config.source_matcher().unwrap().is_none());

        config.exclude_source = Some("*.tmp".into());
        config.pattern_syntax = PatternSyntax::Glob;
        let matcher = config.source_matcher().unwrap().unwrap();
        assert!(matcher.is_match("a/b.tmp"));

        config.pattern_syntax = PatternSyntax::Regex;
        assert!(matches!(
            config.source_matcher(),
            Err(SyncError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_pattern_syntax_compile() {
        let glob = PatternSyntax::Glob.compile("build/**").unwrap();
        assert!(glob.is_match("build/out/app"));
        assert!(!glob.is_match("src/build"));

        let regex = PatternSyntax::Regex.compile("build").unwrap();
        assert!(regex.is_match("src/build"));

        assert!(matches!(
            PatternSyntax::Glob.compile("a[").err(),
            Some(SyncError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_validate_paths_creates_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("out/dst");
        fs::create_dir(&src).unwrap();

        let config = SyncConfig::new(&src, &dst);
        assert!(matches!(
            config.validate_paths(false),
            Err(SyncError::NotFound { .. })
        ));
        config.validate_paths(true).unwrap();
        assert!(dst.is_dir());
    }

    #[test]
    fn test_validate_paths_rejects_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();

        let config = SyncConfig::new(&file, temp.path());
        assert!(matches!(
            config.validate_paths(true),
            Err(SyncError::NotADirectory { .. })
        ));

        let config = SyncConfig::new(temp.path(), &file);
        assert!(matches!(
            config.validate_paths(true),
            Err(SyncError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: SyncConfig = serde_json::from_str(
            r#"{ "source": "src", "dest": "bld", "dry_run": true, "pattern_syntax": "glob" }"#,
        )
        .unwrap();
        assert_eq!(config.destination, PathBuf::from("bld"));
        assert!(config.dry_run);
        assert_eq!(config.pattern_syntax, PatternSyntax::Glob);
    }
}
