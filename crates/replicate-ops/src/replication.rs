//! One source → destination replication run: scan both sides, plan, apply.

use tokio_util::sync::CancellationToken;

use replicate_core::{Inventory, SyncConfig, SyncError, SyncPlan};
use replicate_scan::TreeScanner;

use crate::executor::Executor;
use crate::planner::plan;
use crate::reporter::Reporter;
use crate::summary::ApplySummary;

/// Scanned and planned replication, ready to be applied.
///
/// The source and destination must already be validated directories (see
/// [`SyncConfig::validate_paths`]).
#[derive(Debug)]
pub struct Replication {
    config: SyncConfig,
    source: Inventory,
    destination: Inventory,
    plan: SyncPlan,
}

impl Replication {
    /// Scan both trees and compute the plan.
    pub fn prepare(config: &SyncConfig, scanner: &TreeScanner) -> Result<Self, SyncError> {
        let source_matcher = config.source_matcher()?;
        let destination_matcher = config.destination_matcher()?;

        let source = scanner.scan(&config.source, source_matcher.as_deref())?;
        let destination = scanner.scan(&config.destination, destination_matcher.as_deref())?;
        let plan = plan(&source, &destination)?;

        tracing::info!(
            source = %config.source.display(),
            destination = %config.destination.display(),
            actions = plan.len(),
            "replication planned"
        );

        Ok(Self {
            config: config.clone(),
            source,
            destination,
            plan,
        })
    }

    /// Configuration this run was prepared from.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Source inventory.
    pub fn source(&self) -> &Inventory {
        &self.source
    }

    /// Destination inventory as scanned before applying.
    pub fn destination(&self) -> &Inventory {
        &self.destination
    }

    /// Planned actions.
    pub fn plan(&self) -> &SyncPlan {
        &self.plan
    }

    /// Apply the plan, honouring the config's dry-run flag.
    pub fn apply(
        &self,
        reporter: &mut dyn Reporter,
        cancel: Option<CancellationToken>,
    ) -> Result<ApplySummary, SyncError> {
        let mut executor =
            Executor::new(&self.source, &self.config.destination).dry_run(self.config.dry_run);
        if let Some(token) = cancel {
            executor = executor.with_cancellation(token);
        }
        executor.apply(&self.plan, reporter)
    }
}

/// Replicate `config.source` into `config.destination` in one call.
pub fn replicate(
    config: &SyncConfig,
    reporter: &mut dyn Reporter,
) -> Result<ApplySummary, SyncError> {
    Replication::prepare(config, &TreeScanner::new())?.apply(reporter, None)
}
