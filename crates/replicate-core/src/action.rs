//! Planned actions and the sync plan.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::entry::EntryKind;

/// The kind of filesystem action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum Operation {
    /// Path is new in the destination.
    Create,
    /// Path exists with a different mode; its nested Delete precedes it.
    Replace,
    /// Path exists with an older modification time.
    Update,
    /// Deferred directory timestamp reset.
    Touch,
    /// Path no longer exists in the source.
    Delete,
}

impl Operation {
    /// All operations, in reporting order.
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Replace,
        Operation::Update,
        Operation::Touch,
        Operation::Delete,
    ];

    /// Past-tense verb for summaries.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Replace => "replaced",
            Self::Update => "updated",
            Self::Touch => "touched",
            Self::Delete => "deleted",
        }
    }
}

/// One planned operation on one relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub operation: Operation,
    /// Entry type the operation applies to.
    pub kind: EntryKind,
    /// Root-relative path.
    pub path: String,
}

impl Action {
    /// Create a new action.
    pub fn new(operation: Operation, kind: EntryKind, path: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            path: path.into(),
        }
    }

    /// Create a `Create` action.
    pub fn create(kind: EntryKind, path: impl Into<String>) -> Self {
        Self::new(Operation::Create, kind, path)
    }

    /// Create a `Replace` action.
    pub fn replace(kind: EntryKind, path: impl Into<String>) -> Self {
        Self::new(Operation::Replace, kind, path)
    }

    /// Create an `Update` action.
    pub fn update(kind: EntryKind, path: impl Into<String>) -> Self {
        Self::new(Operation::Update, kind, path)
    }

    /// Create a directory `Touch` action.
    pub fn touch(path: impl Into<String>) -> Self {
        Self::new(Operation::Touch, EntryKind::Directory, path)
    }

    /// Create a `Delete` action.
    pub fn delete(kind: EntryKind, path: impl Into<String>) -> Self {
        Self::new(Operation::Delete, kind, path)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.kind.is_dir() { "/" } else { "" };
        write!(
            f,
            "{}: [{}] {}{}",
            self.operation, self.kind, self.path, suffix
        )
    }
}

/// Per-operation tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounts {
    pub create: usize,
    pub replace: usize,
    pub update: usize,
    pub touch: usize,
    pub delete: usize,
}

impl OperationCounts {
    /// Count one operation.
    pub fn record(&mut self, operation: Operation) {
        *self.slot(operation) += 1;
    }

    /// Count for a single operation.
    pub fn get(&self, operation: Operation) -> usize {
        match operation {
            Operation::Create => self.create,
            Operation::Replace => self.replace,
            Operation::Update => self.update,
            Operation::Touch => self.touch,
            Operation::Delete => self.delete,
        }
    }

    /// Sum over all operations.
    pub fn total(&self) -> usize {
        self.create + self.replace + self.update + self.touch + self.delete
    }

    fn slot(&mut self, operation: Operation) -> &mut usize {
        match operation {
            Operation::Create => &mut self.create,
            Operation::Replace => &mut self.replace,
            Operation::Update => &mut self.update,
            Operation::Touch => &mut self.touch,
            Operation::Delete => &mut self.delete,
        }
    }
}

/// Ordered list of actions: deletions, then creations and updates, then
/// directory touches. Must be applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    actions: Vec<Action>,
}

impl SyncPlan {
    /// Wrap an already-ordered action list.
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// The actions in apply order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Tally actions per operation.
    pub fn counts(&self) -> OperationCounts {
        let mut counts = OperationCounts::default();
        for action in &self.actions {
            counts.record(action.operation);
        }
        counts
    }
}

impl<'a> IntoIterator for &'a SyncPlan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
