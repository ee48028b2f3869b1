//! Applies a [`SyncPlan`] to the destination tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use filetime::FileTime;
use tokio_util::sync::CancellationToken;

use replicate_core::{Action, EntryKind, Inventory, Operation, PathEntry, SyncError, SyncPlan};

use crate::reporter::Reporter;
use crate::summary::ApplySummary;

/// Executes plan actions in order against the filesystem.
///
/// Metadata for creations, updates and touches comes from the source
/// inventory the plan was computed from.
#[derive(Debug)]
pub struct Executor<'a> {
    source: &'a Inventory,
    destination_root: PathBuf,
    dry_run: bool,
    cancel: Option<CancellationToken>,
}

impl<'a> Executor<'a> {
    /// Create an executor replicating from `source` into `destination_root`.
    pub fn new(source: &'a Inventory, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination_root: destination_root.into(),
            dry_run: false,
            cancel: None,
        }
    }

    /// Only report actions, never mutate.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stop between two actions once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Apply every action of `plan` in order.
    ///
    /// The reporter sees each action before it is applied. The first failure
    /// aborts the remainder of the plan; nothing already applied is rolled
    /// back.
    pub fn apply(
        &self,
        plan: &SyncPlan,
        reporter: &mut dyn Reporter,
    ) -> Result<ApplySummary, SyncError> {
        let start = Instant::now();
        let mut summary = ApplySummary::new(self.dry_run);

        for action in plan {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                tracing::warn!(path = %action.path, "apply cancelled");
                return Err(SyncError::Interrupted);
            }

            reporter.report(action);

            let bytes = if self.dry_run {
                0
            } else {
                self.apply_action(action)?
            };
            summary.record(action.operation, bytes);
        }

        summary.duration = start.elapsed();
        tracing::info!(
            actions = summary.total_actions(),
            bytes = summary.bytes_copied,
            dry_run = self.dry_run,
            "apply complete"
        );
        Ok(summary)
    }

    /// Perform one action, returning the number of content bytes copied.
    fn apply_action(&self, action: &Action) -> Result<u64, SyncError> {
        let target = self.destination_root.join(&action.path);
        tracing::debug!(
            operation = %action.operation,
            kind = %action.kind,
            path = %target.display(),
            "applying"
        );

        match action.operation {
            Operation::Delete => {
                remove_entry(&target, action.kind)?;
                Ok(0)
            }
            Operation::Touch => {
                let entry = self.source_entry(&action.path)?;
                set_permissions(&target, entry.permissions())?;
                set_times(&target, entry)?;
                Ok(0)
            }
            Operation::Create | Operation::Replace | Operation::Update => {
                let entry = self.source_entry(&action.path)?;
                let source_path = self.source.root_path().join(&action.path);
                match action.kind {
                    EntryKind::File => copy_file(&source_path, &target, entry),
                    EntryKind::Directory => {
                        if action.operation != Operation::Update {
                            fs::create_dir(&target).map_err(|e| SyncError::io(&target, e))?;
                        }
                        Ok(0)
                    }
                    EntryKind::Symlink => {
                        if action.operation == Operation::Update {
                            remove_entry(&target, EntryKind::Symlink)?;
                        }
                        copy_symlink(&source_path, &target, entry)?;
                        Ok(0)
                    }
                    EntryKind::Other => Err(SyncError::UnsupportedType {
                        path: action.path.clone(),
                        kind: action.kind,
                    }),
                }
            }
        }
    }

    fn source_entry(&self, path: &str) -> Result<&'a PathEntry, SyncError> {
        self.source.get(path).ok_or_else(|| SyncError::NotFound {
            path: self.source.root_path().join(path),
        })
    }
}

/// Remove a destination entry. Directories are removed recursively; a path
/// that is already gone is not an error.
fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), SyncError> {
    let result = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File | EntryKind::Symlink | EntryKind::Other => fs::remove_file(path),
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other.map_err(|e| SyncError::io(path, e)),
    }
}

/// Copy file content, then permissions and times.
fn copy_file(source: &Path, dest: &Path, entry: &PathEntry) -> Result<u64, SyncError> {
    let bytes = fs::copy(source, dest).map_err(|e| SyncError::io(source, e))?;
    set_permissions(dest, entry.permissions())?;
    set_times(dest, entry)?;
    Ok(bytes)
}

/// Recreate a symlink with the source's target, permissions and times.
fn copy_symlink(source: &Path, dest: &Path, entry: &PathEntry) -> Result<(), SyncError> {
    let target = fs::read_link(source).map_err(|e| SyncError::io(source, e))?;
    create_symlink(&target, dest).map_err(|e| SyncError::io(dest, e))?;
    set_symlink_permissions(dest, entry.permissions())?;
    filetime::set_symlink_file_times(
        dest,
        FileTime::from_system_time(entry.timestamps.accessed),
        FileTime::from_system_time(entry.timestamps.modified),
    )
    .map_err(|e| SyncError::io(dest, e))
}

fn set_times(path: &Path, entry: &PathEntry) -> Result<(), SyncError> {
    filetime::set_file_times(
        path,
        FileTime::from_system_time(entry.timestamps.accessed),
        FileTime::from_system_time(entry.timestamps.modified),
    )
    .map_err(|e| SyncError::io(path, e))
}

// Cross-platform helpers

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<(), SyncError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| SyncError::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(path: &Path, mode: u32) -> Result<(), SyncError> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| SyncError::io(path, e))?
        .permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions).map_err(|e| SyncError::io(path, e))
}

/// Set the permission bits of the link itself. Linux has no link modes and
/// reports `ENOTSUP`, which is accepted.
#[cfg(unix)]
fn set_symlink_permissions(path: &Path, mode: u32) -> Result<(), SyncError> {
    use rustix::fs::{AtFlags, CWD, Mode, RawMode, chmodat};
    use rustix::io::Errno;

    let mode = Mode::from_raw_mode(mode as RawMode);
    match chmodat(CWD, path, mode, AtFlags::SYMLINK_NOFOLLOW) {
        Ok(()) => Ok(()),
        Err(e) if e == Errno::NOTSUP || e == Errno::OPNOTSUPP => Ok(()),
        Err(e) => Err(SyncError::io(path, io::Error::from(e))),
    }
}

#[cfg(not(unix))]
fn set_symlink_permissions(_path: &Path, _mode: u32) -> Result<(), SyncError> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
