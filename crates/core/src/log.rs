// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The append-only audit log entry (spec §3.4).

use crate::id::{LogEntryId, SessionId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of `todo-log.json`(l). Independent of every other line: only
/// last-write-wins across lines, so no entry may depend on a prior one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub timestamp: String,
    #[serde(default, rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub action: String,
    pub actor: String,
    #[serde(default, rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(default)]
    pub details: Value,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp: timestamp.into(),
            session_id: None,
            action: action.into(),
            actor: actor.into(),
            task_id: None,
            before: None,
            after: None,
            details: Value::Object(Default::default()),
        }
    }

    pub fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_diff(mut self, before: Option<Value>, after: Option<Value>) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
