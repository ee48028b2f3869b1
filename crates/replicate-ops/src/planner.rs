//! Turns a source and a destination inventory into an ordered [`SyncPlan`].

use std::collections::VecDeque;

use replicate_core::{Action, EntryKind, Inventory, Operation, PathEntry, SyncError, SyncPlan};

/// Compute the actions converging `destination` to `source`.
///
/// The plan has three contiguous phases:
///
/// 1. Deletions of destination-only paths, in reverse destination order so
///    descendants come before their ancestors.
/// 2. Creations, replacements and updates in source order. A replacement is
///    preceded by a Delete of the stale destination entry.
/// 3. Directory touches, deepest-discovered first, so no child mutation
///    follows the reset of its parent's timestamps.
///
/// A source entry of type [`EntryKind::Other`] that needs any action is an
/// error.
pub fn plan(source: &Inventory, destination: &Inventory) -> Result<SyncPlan, SyncError> {
    let mut actions = Vec::new();

    for entry in destination.entries().rev() {
        if entry.is_root() || source.contains(&entry.path) {
            continue;
        }
        actions.push(Action::delete(entry.kind, &entry.path));
    }

    let mut touches: VecDeque<Action> = VecDeque::new();
    // Destination directory removed by a Replace; its old contents are gone
    // by the time anything below it is applied.
    let mut replaced_dir: Option<&str> = None;

    for src in source.entries() {
        if src.is_root() {
            continue;
        }

        if replaced_dir.is_some_and(|dir| !is_descendant(&src.path, dir)) {
            replaced_dir = None;
        }
        let existing = match replaced_dir {
            Some(_) => None,
            None => destination.get(&src.path),
        };

        let Some((operation, stale)) = classify(src, existing) else {
            continue;
        };

        if let Some(stale) = stale {
            actions.push(Action::delete(stale.kind, &stale.path));
            if stale.kind.is_dir() {
                replaced_dir = Some(src.path.as_str());
            }
        }

        match src.kind {
            EntryKind::File | EntryKind::Symlink => {
                actions.push(Action::new(operation, src.kind, &src.path));
            }
            EntryKind::Directory => {
                if operation != Operation::Update {
                    actions.push(Action::new(operation, src.kind, &src.path));
                }
                touches.push_front(Action::touch(&src.path));
            }
            EntryKind::Other => {
                return Err(SyncError::UnsupportedType {
                    path: src.path.clone(),
                    kind: src.kind,
                });
            }
        }
    }

    actions.extend(touches);

    tracing::debug!(actions = actions.len(), "plan computed");
    Ok(SyncPlan::from_actions(actions))
}

/// Decide what to do with one source entry. Returns `None` for Skip, and the
/// stale destination entry to delete first for a Replace.
fn classify<'a>(
    src: &PathEntry,
    existing: Option<&'a PathEntry>,
) -> Option<(Operation, Option<&'a PathEntry>)> {
    match existing {
        None => Some((Operation::Create, None)),
        Some(dst) if dst.mode != src.mode => Some((Operation::Replace, Some(dst))),
        Some(dst) if src.modified() > dst.modified() => Some((Operation::Update, None)),
        Some(_) => None,
    }
}

fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
