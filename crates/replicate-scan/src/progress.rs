//! Scan progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of entries recorded so far.
    pub entries_scanned: u64,
    /// Number of directories recorded so far.
    pub dirs_scanned: u64,
    /// Number of regular files recorded so far.
    pub files_scanned: u64,
    /// Number of entries pruned by the exclusion matcher.
    pub excluded: u64,
    /// Path most recently recorded.
    pub current_path: PathBuf,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
    /// Whether this is the final snapshot of the scan.
    pub finished: bool,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            entries_scanned: 0,
            dirs_scanned: 0,
            files_scanned: 0,
            excluded: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Calculate scan rate in entries per second.
    pub fn entries_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.entries_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}
