//! Core types and traits for replicate.
//!
//! This crate provides the data model shared by the scanner, the planner and
//! the executor: path entries, inventories, actions, plans, exclusion
//! matchers and configuration.

mod action;
mod config;
mod entry;
mod error;
mod inventory;
mod matcher;

pub use action::{Action, Operation, OperationCounts, SyncPlan};
pub use config::{PatternSyntax, SyncConfig, SyncConfigBuilder};
pub use entry::{EntryKind, PathEntry, Timestamps, join_relative, path_depth};
pub use error::{ErrorCategory, SyncError};
pub use inventory::{Inventory, InventoryStats};
pub use matcher::{GlobMatcher, PathMatcher, RegexMatcher};
