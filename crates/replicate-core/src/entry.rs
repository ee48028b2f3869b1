//! Path entry types.

use std::fs::{FileType, Metadata};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Type of a scanned path, decided once from a non-following stat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum EntryKind {
    /// Regular file.
    #[strum(serialize = "FILE")]
    File,
    /// Directory.
    #[strum(serialize = "DIR")]
    Directory,
    /// Symbolic link (never followed).
    #[strum(serialize = "LINK")]
    Symlink,
    /// Sockets, devices, fifos.
    #[strum(serialize = "OTHER")]
    Other,
}

impl EntryKind {
    /// Classify a file type as returned by `symlink_metadata`.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Access and modification times of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time. Falls back to `modified` where unavailable.
    pub accessed: SystemTime,
}

impl Timestamps {
    /// Create timestamps from explicit times.
    pub fn new(modified: SystemTime, accessed: SystemTime) -> Self {
        Self { modified, accessed }
    }

    /// Create timestamps where access time equals modification time.
    pub fn with_modified(modified: SystemTime) -> Self {
        Self::new(modified, modified)
    }

    /// Read timestamps from metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        let accessed = metadata.accessed().unwrap_or(modified);
        Self::new(modified, accessed)
    }
}

/// One scanned path and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Root-relative path with `/` separators; the root itself is `""`.
    pub path: String,

    /// Entry type.
    pub kind: EntryKind,

    /// Full `st_mode`: type bits plus permission bits.
    pub mode: u32,

    /// Access and modification times.
    pub timestamps: Timestamps,
}

impl PathEntry {
    /// Create a new entry.
    pub fn new(
        path: impl Into<String>,
        kind: EntryKind,
        mode: u32,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            mode,
            timestamps,
        }
    }

    /// Build an entry from `symlink_metadata` output.
    pub fn from_metadata(path: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::from_file_type(metadata.file_type()),
            mode: get_mode(metadata),
            timestamps: Timestamps::from_metadata(metadata),
        }
    }

    /// Permission bits only (`mode & 0o7777`).
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Last modification time.
    pub fn modified(&self) -> SystemTime {
        self.timestamps.modified
    }

    /// Whether this is the scanned root.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Depth below the root (root = 0).
    pub fn depth(&self) -> u32 {
        path_depth(&self.path)
    }
}

/// Depth of a relative path, counted from the root at 0.
pub fn path_depth(path: &str) -> u32 {
    if path.is_empty() {
        0
    } else {
        path.split('/').count() as u32
    }
}

/// Join a child name onto a relative path.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn get_mode(metadata: &Metadata) -> u32 {
    // Approximate st_mode so type changes still show up as mode changes.
    let file_type = metadata.file_type();
    let (type_bits, perm) = if file_type.is_dir() {
        (0o040000, 0o755)
    } else if file_type.is_symlink() {
        (0o120000, 0o777)
    } else if file_type.is_file() {
        (0o100000, 0o644)
    } else {
        (0, 0o644)
    };
    let perm = if metadata.permissions().readonly() {
        perm & !0o222
    } else {
        perm
    };
    type_bits | perm
}
