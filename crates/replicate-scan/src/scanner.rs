//! Sequential pre-order directory scanner.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use tokio::sync::broadcast;

use replicate_core::{
    Inventory, InventoryStats, PathEntry, PathMatcher, SyncError, join_relative,
};

use crate::progress::ScanProgress;

/// Number of recorded entries between two progress snapshots.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Depth-first scanner producing an [`Inventory`].
///
/// The walk is strictly sequential: the planner relies on the exact
/// pre-order of the resulting path list.
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan the subtree at `root`.
    ///
    /// Paths accepted by `exclude` are pruned together with everything below
    /// them, before any filesystem access. Any stat or listing failure aborts
    /// the scan.
    pub fn scan(
        &self,
        root: impl AsRef<Path>,
        exclude: Option<&dyn PathMatcher>,
    ) -> Result<Inventory, SyncError> {
        let root = root.as_ref();
        let start = Instant::now();

        let mut entries: IndexMap<String, PathEntry> = IndexMap::new();
        let mut stats = InventoryStats::new();
        let mut progress = ScanProgress::new();

        // Children are pushed in reverse listing order so that popping yields
        // pre-order.
        let mut stack: Vec<(String, u32)> = vec![(String::new(), 0)];

        while let Some((rel_path, depth)) = stack.pop() {
            if exclude.is_some_and(|m| m.is_match(&rel_path)) {
                tracing::debug!(path = %rel_path, "excluded");
                progress.excluded += 1;
                continue;
            }

            let full_path = resolve(root, &rel_path);
            let metadata = stat(&full_path, rel_path.is_empty())?;
            let entry = PathEntry::from_metadata(rel_path.clone(), &metadata);
            let kind = entry.kind;

            stats.record(kind, depth);
            entries.insert(rel_path.clone(), entry);

            if kind.is_dir() {
                let children = list_dir(&full_path)?;
                for name in children.into_iter().rev() {
                    stack.push((join_relative(&rel_path, &name), depth + 1));
                }
            }

            progress.entries_scanned += 1;
            progress.dirs_scanned = stats.dirs;
            progress.files_scanned = stats.files;
            if progress.entries_scanned % PROGRESS_INTERVAL == 0 {
                progress.current_path = full_path;
                progress.elapsed = start.elapsed();
                let _ = self.progress_tx.send(progress.clone());
            }
        }

        let scan_duration = start.elapsed();
        progress.elapsed = scan_duration;
        progress.finished = true;
        let _ = self.progress_tx.send(progress);

        tracing::debug!(
            root = %root.display(),
            dirs = stats.dirs,
            files = stats.files,
            others = stats.others,
            max_depth = stats.max_depth,
            "scan complete"
        );

        Ok(Inventory::new(
            root.to_path_buf(),
            entries,
            stats,
            scan_duration,
        ))
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute path of a root-relative path.
fn resolve(root: &Path, rel_path: &str) -> PathBuf {
    if rel_path.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel_path)
    }
}

/// Stat without following links. The root is followed, since it is known to
/// be a directory and may be reached through a link.
fn stat(path: &Path, is_root: bool) -> Result<fs::Metadata, SyncError> {
    let result = if is_root {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    };
    result.map_err(|e| SyncError::io(path, e))
}

/// Child names of a directory, in listing order.
fn list_dir(path: &Path) -> Result<Vec<String>, SyncError> {
    let read_dir = fs::read_dir(path).map_err(|e| SyncError::io(path, e))?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| SyncError::io(path, e))?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|name| SyncError::NonUtf8Path {
                path: path.join(name),
            })?;
        names.push(name);
    }
    Ok(names)
}
