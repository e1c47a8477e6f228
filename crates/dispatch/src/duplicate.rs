// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe re-execution rules for the task domain (spec §4.10): duplicate
//! detection on `add`, and the already-live/missing classification
//! `restore`/`unarchive` needs to stay idempotent across retries. Grounded
//! on spec.md's three named idempotence cases; pure functions over already-
//! loaded state, the same shape `cleo-validate`'s validators use.

use cleo_core::{Task, TaskId};

/// Find a live task matching `title` (already NFC-normalised) and `phase`
/// whose `createdAt` falls within `window_ms` of `now_ms` (spec §4.4 `add`,
/// §4.10). Returns the first match; ties are broken by list order, which is
/// insertion order.
pub fn find_duplicate<'a>(
    tasks: &'a [Task],
    title: &str,
    phase: Option<&str>,
    now_ms: i64,
    window_ms: i64,
) -> Option<&'a Task> {
    tasks.iter().find(|t| {
        t.title == title
            && t.phase.as_deref() == phase
            && parse_epoch_ms(&t.created_at).is_some_and(|created| now_ms - created <= window_ms)
    })
}

fn parse_epoch_ms(rfc3339: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(rfc3339).ok().map(|dt| dt.timestamp_millis())
}

/// The three-way split `restore`/`unarchive` needs: ids already live are
/// skipped (not an error), ids absent from both sets are reported as
/// missing, everything else restores (spec §4.10 `unarchive`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreClassification {
    pub restorable: Vec<TaskId>,
    pub already_live: Vec<TaskId>,
    pub missing: Vec<TaskId>,
}

pub fn classify_restore_targets(
    live_ids: &std::collections::BTreeSet<TaskId>,
    archived_ids: &std::collections::BTreeSet<TaskId>,
    requested: &[TaskId],
) -> RestoreClassification {
    let mut out = RestoreClassification::default();
    for id in requested {
        if live_ids.contains(id) {
            out.already_live.push(*id);
        } else if archived_ids.contains(id) {
            out.restorable.push(*id);
        } else {
            out.missing.push(*id);
        }
    }
    out
}

#[cfg(test)]
#[path = "duplicate_tests.rs"]
mod tests;
