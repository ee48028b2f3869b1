//! Sync planner and executor for replicate.
//!
//! This crate turns two scanned inventories into an ordered [`SyncPlan`] and
//! applies it to the destination tree, reporting every action through a
//! [`Reporter`].
//!
//! ```rust,no_run
//! use replicate_ops::{LogReporter, SyncConfig, replicate};
//!
//! let config = SyncConfig::builder()
//!     .source("src")
//!     .destination("bld")
//!     .exclude_destination(r"(?:^|/)\.git(?:/|$)")
//!     .build()
//!     .unwrap();
//!
//! config.validate_paths(true).unwrap();
//! let summary = replicate(&config, &mut LogReporter).unwrap();
//! println!("{}", summary.summary());
//! ```

mod executor;
mod planner;
mod replication;
mod reporter;
mod summary;

pub use executor::Executor;
pub use planner::plan;
pub use replication::{Replication, replicate};
pub use reporter::{ChannelReporter, CollectingReporter, LogReporter, NullReporter, Reporter};
pub use summary::ApplySummary;

// Re-export core types
pub use replicate_core::{Action, EntryKind, Inventory, Operation, SyncConfig, SyncError, SyncPlan};
