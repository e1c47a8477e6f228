// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two root documents (`todo.json`, `todo-archive.json`) that every
//! domain handler loads, mutates, and commits atomically (spec §6.2).

use cleo_core::{ArchiveEntry, CleoError, Session, Task};
use cleo_storage::{compute_checksum, SaveOptions, Store};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// `_meta.schemaVersion` stamped on every root document this process writes
/// (spec §3.5). Bump when a root document's shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Meta {
    fn default() -> Self {
        Self { checksum: None, schema_version: SCHEMA_VERSION }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub name: String,
    pub order: u32,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub phases: std::collections::BTreeMap<String, PhaseInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<cleo_core::TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
}

/// `todo.json`: the live project state (spec §6.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFile {
    #[serde(default, rename = "_meta")]
    pub meta: Meta,
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub focus: FocusState,
    #[serde(default)]
    pub last_updated: String,
}

impl TodoFile {
    /// Recompute and stamp `_meta.checksum` over `tasks` sorted by id.
    pub fn restamp_checksum(&mut self) -> Result<(), CleoError> {
        let mut sorted = self.tasks.clone();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        self.meta.checksum = Some(compute_checksum(&sorted)?);
        self.meta.schema_version = SCHEMA_VERSION;
        Ok(())
    }

    pub fn load(store: &Store, path: &Path) -> Result<Self, CleoError> {
        match store.load(path) {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(cleo_storage::StoreError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, store: &Store, path: &Path, lock_timeout: Duration) -> Result<(), CleoError> {
        let value = serde_json::to_value(self)?;
        store.save(path, &value, SaveOptions { backup: true, lock_timeout })?;
        Ok(())
    }
}

/// `todo-archive.json`: tasks moved out of the live set (spec §3.3, §6.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFile {
    #[serde(default, rename = "_meta")]
    pub meta: Meta,
    #[serde(default)]
    pub archived_tasks: Vec<ArchiveEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

impl ArchiveFile {
    pub fn restamp_checksum(&mut self) -> Result<(), CleoError> {
        let mut sorted = self.archived_tasks.clone();
        sorted.sort_by(|a, b| a.task.id.cmp(&b.task.id));
        self.meta.checksum = Some(compute_checksum(&sorted)?);
        self.meta.schema_version = SCHEMA_VERSION;
        Ok(())
    }

    pub fn load(store: &Store, path: &Path) -> Result<Self, CleoError> {
        match store.load(path) {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(cleo_storage::StoreError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, store: &Store, path: &Path, lock_timeout: Duration) -> Result<(), CleoError> {
        let value = serde_json::to_value(self)?;
        store.save(path, &value, SaveOptions { backup: true, lock_timeout })?;
        Ok(())
    }
}

/// `sessions.json`: the live session set (spec §3.2, §4.5). Not named in
/// spec.md §6.1's filesystem layout; resolved as an Open Question
/// (SPEC_FULL.md §11.6) by giving sessions the same root-document
/// treatment as `todo.json`/`todo-archive.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsFile {
    #[serde(default, rename = "_meta")]
    pub meta: Meta,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl SessionsFile {
    pub fn restamp_checksum(&mut self) -> Result<(), CleoError> {
        let mut sorted = self.sessions.clone();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        self.meta.checksum = Some(compute_checksum(&sorted)?);
        self.meta.schema_version = SCHEMA_VERSION;
        Ok(())
    }

    pub fn load(store: &Store, path: &Path) -> Result<Self, CleoError> {
        match store.load(path) {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(cleo_storage::StoreError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, store: &Store, path: &Path, lock_timeout: Duration) -> Result<(), CleoError> {
        let value = serde_json::to_value(self)?;
        store.save(path, &value, SaveOptions { backup: true, lock_timeout })?;
        Ok(())
    }

    pub fn active_elsewhere(&self, scope: &cleo_core::Scope, exclude: &cleo_core::SessionId) -> bool {
        self.sessions
            .iter()
            .filter(|s| &s.id != exclude)
            .filter(|s| s.is_active())
            .any(|s| s.scope.overlaps(scope))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
