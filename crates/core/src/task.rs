// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task entity and its small enums (spec §3.1).

use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Active,
    Blocked,
    Done,
    Cancelled,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Active => "active",
        Blocked => "blocked",
        Done => "done",
        Cancelled => "cancelled",
    }
}

/// Priority of a task. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

crate::simple_display! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

/// Task hierarchy level (spec §3.1): epics are roots, subtasks are leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Epic,
    Task,
    Subtask,
}

crate::simple_display! {
    TaskType {
        Epic => "epic",
        Task => "task",
        Subtask => "subtask",
    }
}

impl TaskType {
    /// The maximum depth (root = 0) a task of this type may sit at.
    pub fn expected_depth(self) -> u32 {
        match self {
            TaskType::Epic => 0,
            TaskType::Task => 1,
            TaskType::Subtask => 2,
        }
    }
}

/// Rough sizing estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSize {
    Small,
    Medium,
    Large,
}

crate::simple_display! {
    TaskSize {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

/// Tag on a system-generated note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteTag {
    Cancelled,
    AutoCompleted,
    Note,
}

crate::simple_display! {
    NoteTag {
        Cancelled => "CANCELLED",
        AutoCompleted => "AUTO-COMPLETED",
        Note => "NOTE",
    }
}

/// A single timestamped, tagged note on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub at: String,
    pub tag: NoteTag,
    pub text: String,
}

impl Note {
    pub fn new(at: impl Into<String>, tag: NoteTag, text: impl Into<String>) -> Self {
        Self { at: at.into(), tag, text: text.into() }
    }

    /// Render as `[TAG hh:mm] text`, the form used in CLI/text output.
    pub fn render(&self) -> String {
        format!("[{} {}] {}", self.tag, self.at, self.text)
    }
}

/// The kind of relation between two tasks (spec §3.1 `relates`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    RelatesTo,
    SpawnedFrom,
    DeferredTo,
    Supersedes,
    Duplicates,
}

crate::simple_display! {
    RelationType {
        RelatesTo => "relates-to",
        SpawnedFrom => "spawned-from",
        DeferredTo => "deferred-to",
        Supersedes => "supersedes",
        Duplicates => "duplicates",
    }
}

/// A link from one task to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The five named quality gates plus their conjunction (spec §3.1, §4.4 `verify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Verification {
    pub implemented: bool,
    #[serde(rename = "testsPassed")]
    pub tests_passed: bool,
    #[serde(rename = "qaPassed")]
    pub qa_passed: bool,
    #[serde(rename = "securityPassed")]
    pub security_passed: bool,
    pub documented: bool,
    /// Derived: conjunction of whichever gates `verification.gates` configures.
    #[serde(default)]
    pub passed: bool,
}

/// The fixed set of gate names recognised by [`Verification::gate`].
pub const GATE_NAMES: &[&str] =
    &["implemented", "testsPassed", "qaPassed", "securityPassed", "documented"];

impl Verification {
    pub fn gate(&self, name: &str) -> Option<bool> {
        match name {
            "implemented" => Some(self.implemented),
            "testsPassed" => Some(self.tests_passed),
            "qaPassed" => Some(self.qa_passed),
            "securityPassed" => Some(self.security_passed),
            "documented" => Some(self.documented),
            _ => None,
        }
    }

    pub fn set_gate(&mut self, name: &str, value: bool) -> bool {
        match name {
            "implemented" => { self.implemented = value; true }
            "testsPassed" => { self.tests_passed = value; true }
            "qaPassed" => { self.qa_passed = value; true }
            "securityPassed" => { self.security_passed = value; true }
            "documented" => { self.documented = value; true }
            _ => false,
        }
    }

    /// Recompute [`Self::passed`] as the conjunction of the configured gates.
    /// An empty `gates` list means "all five" (the spec default).
    pub fn recompute_passed(&mut self, configured_gates: &[String]) {
        let names: Vec<&str> = if configured_gates.is_empty() {
            GATE_NAMES.to_vec()
        } else {
            configured_gates.iter().map(String::as_str).collect()
        };
        self.passed = names.iter().all(|n| self.gate(n).unwrap_or(false));
    }
}

/// A single task node in the hierarchy/dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TaskSize>,
    #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub depends: BTreeSet<TaskId>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub position: u32,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(default, rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, rename = "cancelledAt", skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    #[serde(default, rename = "cancellationReason", skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub verification: Verification,
    #[serde(default)]
    pub relates: Vec<Relation>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Done | TaskStatus::Cancelled)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        into {
            title: String = "Test task",
        }
        set {
            id: TaskId = TaskId::from_number(1),
            status: TaskStatus = TaskStatus::Pending,
            priority: Priority = Priority::Medium,
            task_type: TaskType = TaskType::Task,
            depends: BTreeSet<TaskId> = BTreeSet::new(),
            labels: BTreeSet<String> = BTreeSet::new(),
            position: u32 = 1,
            created_at: String = "2026-01-01T00:00:00Z".to_string(),
            updated_at: String = "2026-01-01T00:00:00Z".to_string(),
            notes: Vec<Note> = Vec::new(),
            verification: Verification = Verification::default(),
            relates: Vec<Relation> = Vec::new(),
        }
        option {
            description: String = None,
            size: TaskSize = None,
            parent_id: TaskId = None,
            phase: String = None,
            completed_at: String = None,
            cancelled_at: String = None,
            cancellation_reason: String = None,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    pub fn build_with_id(self, n: u32) -> Task {
        self.id(TaskId::from_number(n)).build()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for Task {
    fn default() -> Self {
        TaskBuilder::default().build_with_id(1)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
