// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The archive entry: a task snapshot plus archival metadata (spec §3.3).

use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Where an archive entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveSource {
    /// Swept up by `archive auto` after `archiveAfterDays`.
    Auto,
    /// `cancel`/`delete --force` on a task with children.
    Force,
    /// Explicit `archive <id>` or a plain `cancel`/`delete`.
    Manual,
}

crate::simple_display! {
    ArchiveSource {
        Auto => "auto",
        Force => "force",
        Manual => "manual",
    }
}

/// Archival metadata nested under `_archive` on an archived task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    #[serde(rename = "archivedAt")]
    pub archived_at: String,
    #[serde(rename = "cycleTimeDays")]
    pub cycle_time_days: f64,
    #[serde(rename = "archiveSource")]
    pub archive_source: ArchiveSource,
}

/// A task moved out of the live set, carrying its full snapshot plus
/// [`ArchiveMeta`] (spec §3.3: "mirror of Task at archival time plus `_archive`").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(flatten)]
    pub task: Task,
    #[serde(rename = "_archive")]
    pub archive: ArchiveMeta,
}

impl ArchiveEntry {
    /// Build an archive entry from a live task at the moment it archives.
    /// `cycle_time_days` is the caller's computed `completedAt - createdAt`
    /// in days (0.0 when the task never completed, e.g. a cancelled task).
    pub fn new(task: Task, archived_at: impl Into<String>, cycle_time_days: f64, source: ArchiveSource) -> Self {
        Self {
            task,
            archive: ArchiveMeta {
                archived_at: archived_at.into(),
                cycle_time_days,
                archive_source: source,
            },
        }
    }

    /// Restore to a live [`Task`], clearing `_archive` and `completedAt`
    /// (spec §3.3: "Restoration clears `_archive` and `completedAt`").
    /// The caller is responsible for setting the restored status
    /// (defaults to `pending` unless `--preserve-status`, and `done` is
    /// never a valid restore target).
    pub fn into_restored_task(self) -> Task {
        let mut task = self.task;
        task.completed_at = None;
        task
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
