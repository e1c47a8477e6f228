// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-repair operations invoked by `validate --fix-*` (spec §4.2).
//! Unlike the pure validators in [`crate::cross`], these mutate a candidate
//! task list in place and report what they changed.

use cleo_core::{Task, TaskId};
use serde::Serialize;
use std::collections::BTreeSet;

/// What to do with a task whose `parentId` points nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Clear `parentId`, keeping the task live at the root.
    Unlink,
    /// Cancel the task in place (caller still owns archiving it).
    Cancel,
}

/// Find tasks whose `parentId` references a missing id and repair them
/// per `policy`. Returns the ids that were fixed.
pub fn check_orphans(tasks: &mut [Task], policy: OrphanPolicy, now: &str) -> Vec<TaskId> {
    let ids: BTreeSet<TaskId> = tasks.iter().map(|t| t.id).collect();
    let orphan_ids: Vec<TaskId> = tasks
        .iter()
        .filter(|t| t.parent_id.is_some_and(|p| !ids.contains(&p)))
        .map(|t| t.id)
        .collect();

    for t in tasks.iter_mut().filter(|t| orphan_ids.contains(&t.id)) {
        match policy {
            OrphanPolicy::Unlink => t.parent_id = None,
            OrphanPolicy::Cancel => {
                t.status = cleo_core::TaskStatus::Cancelled;
                t.cancelled_at = Some(now.to_string());
                t.cancellation_reason = Some("orphaned: parent no longer exists".to_string());
            }
        }
        t.updated_at = now.to_string();
    }
    orphan_ids
}

/// Renumber positions within each parent group to a contiguous `1..=N`
/// sequence, preserving relative order. Returns the number of tasks
/// renumbered.
pub fn check_positions(tasks: &mut [Task]) -> usize {
    use std::collections::BTreeMap;
    let mut by_parent: BTreeMap<Option<TaskId>, Vec<usize>> = BTreeMap::new();
    for (i, t) in tasks.iter().enumerate() {
        by_parent.entry(t.parent_id).or_default().push(i);
    }

    let mut fixed = 0;
    for (_, mut indices) in by_parent {
        indices.sort_by_key(|&i| tasks[i].position);
        for (offset, i) in indices.into_iter().enumerate() {
            let expected = offset as u32 + 1;
            if tasks[i].position != expected {
                tasks[i].position = expected;
                fixed += 1;
            }
        }
    }
    fixed
}

/// Outcome of comparing a stored checksum against a freshly computed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ChecksumOutcome {
    Match,
    /// Stored checksum disagreed; the caller should rewrite it with the
    /// freshly computed value (and optionally quarantine the old file).
    Recomputed { previous: String, current: String },
}

pub fn check_checksum(stored: &str, computed: &str) -> ChecksumOutcome {
    if stored == computed {
        ChecksumOutcome::Match
    } else {
        ChecksumOutcome::Recomputed { previous: stored.to_string(), current: computed.to_string() }
    }
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
