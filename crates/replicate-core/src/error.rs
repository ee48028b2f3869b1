//! Error types for scanning, planning and applying.

use std::path::PathBuf;

use thiserror::Error;

use crate::entry::EntryKind;

/// Errors that abort a replication run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source or destination exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An exclusion pattern failed to compile.
    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A source entry is neither file, directory nor symlink.
    #[error(
        "Unsupported file type {kind} at `{path}` (only files, directories and symbolic links are supported)"
    )]
    UnsupportedType { path: String, kind: EntryKind },

    /// A file name cannot be represented as a relative path string.
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    /// The run was cancelled between two actions.
    #[error("Operation interrupted")]
    Interrupted,
}

/// Coarse classification of [`SyncError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments or configuration, raised before any scan.
    Validation,
    /// Filesystem failure.
    Io,
    /// Source contains an entry type that cannot be replicated.
    UnsupportedType,
    /// Cancelled.
    Interrupted,
}

impl SyncError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotADirectory { .. } | Self::InvalidConfig { .. } | Self::InvalidPattern { .. } => {
                ErrorCategory::Validation
            }
            Self::PermissionDenied { .. }
            | Self::NotFound { .. }
            | Self::Io { .. }
            | Self::NonUtf8Path { .. } => ErrorCategory::Io,
            Self::UnsupportedType { .. } => ErrorCategory::UnsupportedType,
            Self::Interrupted => ErrorCategory::Interrupted,
        }
    }
}
