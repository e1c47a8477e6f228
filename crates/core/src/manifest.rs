// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Research/manifest index entries (spec §4.11).

use crate::id::{ManifestEntryId, TaskId};
use serde::{Deserialize, Serialize};

/// Status of a research artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestStatus {
    Draft,
    Final,
    Superseded,
}

crate::simple_display! {
    ManifestStatus {
        Draft => "draft",
        Final => "final",
        Superseded => "superseded",
    }
}

/// One line of the append-only research/manifest JSONL index (spec §4.11).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: ManifestEntryId,
    pub file: String,
    pub title: String,
    pub date: String,
    pub status: ManifestStatus,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(rename = "keyFindings")]
    pub key_findings: Vec<String>,
    #[serde(default, rename = "needsFollowup")]
    pub needs_followup: Vec<TaskId>,
    #[serde(default, rename = "linkedTasks")]
    pub linked_tasks: Vec<TaskId>,
}

/// Error returned when a manifest entry's `keyFindings` count is out of the
/// `3..7` range the spec requires.
#[derive(Debug, Clone, thiserror::Error)]
#[error("keyFindings must have 3..=7 entries, got {0}")]
pub struct InvalidKeyFindings(pub usize);

impl ManifestEntry {
    pub fn validate(&self) -> Result<(), InvalidKeyFindings> {
        let n = self.key_findings.len();
        if !(3..=7).contains(&n) {
            return Err(InvalidKeyFindings(n));
        }
        Ok(())
    }

    pub fn link_task(&mut self, task_id: TaskId) {
        if !self.linked_tasks.contains(&task_id) {
            self.linked_tasks.push(task_id);
        }
    }

    pub fn has_pending_followup(&self) -> bool {
        !self.needs_followup.is_empty()
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
