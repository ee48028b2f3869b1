//! Result of applying a plan.

use std::time::Duration;

use serde::Serialize;

use replicate_core::{Operation, OperationCounts};

/// Result of a completed apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplySummary {
    /// Actions reported, per operation.
    pub counts: OperationCounts,
    /// Bytes of file content copied (always 0 for dry runs).
    pub bytes_copied: u64,
    /// Whether mutations were suppressed.
    pub dry_run: bool,
    /// Wall-clock time spent applying.
    pub duration: Duration,
}

impl ApplySummary {
    /// Create an empty summary.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Record one reported action.
    pub fn record(&mut self, operation: Operation, bytes: u64) {
        self.counts.record(operation);
        self.bytes_copied += bytes;
    }

    /// Total actions reported.
    pub fn total_actions(&self) -> usize {
        self.counts.total()
    }

    /// Whether the plan was empty.
    pub fn is_empty(&self) -> bool {
        self.total_actions() == 0
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "Nothing to do".to_string();
        }

        let parts: Vec<String> = Operation::ALL
            .iter()
            .filter(|op| self.counts.get(**op) > 0)
            .map(|op| format!("{} {}", self.counts.get(*op), op.past_tense()))
            .collect();

        if self.dry_run {
            format!("{} (dry run)", parts.join(", "))
        } else {
            parts.join(", ")
        }
    }
}
