//! Directory tree scanner for replicate.
//!
//! # Overview
//!
//! `replicate-scan` walks a directory subtree and records every path in an
//! [`Inventory`]:
//!
//! - **Pre-order**: a directory precedes its children, children keep their
//!   directory-listing order
//! - **No link following**: symlinks are recorded as links
//! - **Exclusion** through any [`PathMatcher`], pruning whole subtrees
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use replicate_scan::{RegexMatcher, TreeScanner};
//!
//! let exclude = RegexMatcher::new(r"(?:^|/)\.git(?:/|$)").unwrap();
//! let inventory = TreeScanner::new().scan("/path/to/scan", Some(&exclude)).unwrap();
//!
//! println!("{} dirs, {} files", inventory.stats().dirs, inventory.stats().files);
//! for path in inventory.paths() {
//!     println!("{path}");
//! }
//! ```

mod progress;
mod scanner;

pub use progress::ScanProgress;
pub use scanner::{PROGRESS_INTERVAL, TreeScanner};

// Re-export core types for convenience
pub use replicate_core::{
    EntryKind, GlobMatcher, Inventory, InventoryStats, PathEntry, PathMatcher, RegexMatcher,
    SyncError, Timestamps,
};
