//! Inventory container and statistics.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entry::{EntryKind, PathEntry};

/// Aggregate statistics for a scanned subtree.
///
/// `others` counts everything that is neither a file nor a directory,
/// symlinks included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Number of directories, root included.
    pub dirs: u64,
    /// Number of regular files.
    pub files: u64,
    /// Number of symlinks, devices, sockets and fifos.
    pub others: u64,
    /// Maximum depth of any directory (root = 0).
    pub max_depth: u32,
}

impl InventoryStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory at `depth`.
    pub fn record_dir(&mut self, depth: u32) {
        self.dirs += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a regular file.
    pub fn record_file(&mut self) {
        self.files += 1;
    }

    /// Record anything else.
    pub fn record_other(&mut self) {
        self.others += 1;
    }

    /// Record an entry according to its kind.
    pub fn record(&mut self, kind: EntryKind, depth: u32) {
        match kind {
            EntryKind::Directory => self.record_dir(depth),
            EntryKind::File => self.record_file(),
            EntryKind::Symlink | EntryKind::Other => self.record_other(),
        }
    }

    /// Total number of entries.
    pub fn total(&self) -> u64 {
        self.dirs + self.files + self.others
    }
}

/// Ordered, queryable snapshot of one directory subtree.
///
/// Iteration order is the scan's pre-order: a directory precedes its
/// children, children appear in directory-listing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    root_path: PathBuf,
    entries: IndexMap<String, PathEntry>,
    stats: InventoryStats,
    scan_duration: Duration,
}

impl Inventory {
    /// Assemble an inventory from already-ordered entries and their stats.
    pub fn new(
        root_path: PathBuf,
        entries: IndexMap<String, PathEntry>,
        stats: InventoryStats,
        scan_duration: Duration,
    ) -> Self {
        Self {
            root_path,
            entries,
            stats,
            scan_duration,
        }
    }

    /// Build an inventory from entries in pre-order, deriving the stats.
    ///
    /// A later entry with a path already present is dropped.
    pub fn from_entries(
        root_path: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = PathEntry>,
    ) -> Self {
        let mut map = IndexMap::new();
        let mut stats = InventoryStats::new();
        for entry in entries {
            if map.contains_key(&entry.path) {
                continue;
            }
            stats.record(entry.kind, entry.depth());
            map.insert(entry.path.clone(), entry);
        }
        Self::new(root_path.into(), map, stats, Duration::ZERO)
    }

    /// Directory this inventory was scanned from.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Relative paths in scan order.
    pub fn paths(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in scan order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &PathEntry> + ExactSizeIterator {
        self.entries.values()
    }

    /// Look up an entry by relative path.
    pub fn get(&self, path: &str) -> Option<&PathEntry> {
        self.entries.get(path)
    }

    /// Whether a relative path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// The root entry, unless it was excluded.
    pub fn root(&self) -> Option<&PathEntry> {
        self.entries.get("")
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the inventory has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate statistics.
    pub fn stats(&self) -> &InventoryStats {
        &self.stats
    }

    /// Time the scan took.
    pub fn scan_duration(&self) -> Duration {
        self.scan_duration
    }
}
