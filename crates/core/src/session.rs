// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session entity: lifecycle, focus, decision/assumption log (spec §3.2).

use crate::id::{SessionId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session's work is scoped (spec glossary: `global`, `epic:<id>`,
/// `epic-phase:<id>:<phase>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Epic(TaskId),
    EpicPhase(TaskId, String),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid scope {0:?}: expected 'global', 'epic:<id>', or 'epic-phase:<id>:<phase>'")]
pub struct InvalidScope(pub String);

impl Scope {
    pub fn parse(s: &str) -> Result<Self, InvalidScope> {
        if s == "global" {
            return Ok(Scope::Global);
        }
        if let Some(rest) = s.strip_prefix("epic-phase:") {
            let mut parts = rest.splitn(2, ':');
            let id = parts.next().ok_or_else(|| InvalidScope(s.to_string()))?;
            let phase = parts.next().ok_or_else(|| InvalidScope(s.to_string()))?;
            let task_id = TaskId::parse(id).map_err(|_| InvalidScope(s.to_string()))?;
            return Ok(Scope::EpicPhase(task_id, phase.to_string()));
        }
        if let Some(id) = s.strip_prefix("epic:") {
            let task_id = TaskId::parse(id).map_err(|_| InvalidScope(s.to_string()))?;
            return Ok(Scope::Epic(task_id));
        }
        Err(InvalidScope(s.to_string()))
    }

    /// Whether `self` and `other` overlap (same epic, or one subsumes the other).
    pub fn overlaps(&self, other: &Scope) -> bool {
        match (self, other) {
            (Scope::Global, _) | (_, Scope::Global) => true,
            (Scope::Epic(a), Scope::Epic(b)) => a == b,
            (Scope::Epic(a), Scope::EpicPhase(b, _)) | (Scope::EpicPhase(b, _), Scope::Epic(a)) => a == b,
            (Scope::EpicPhase(a, pa), Scope::EpicPhase(b, pb)) => a == b && pa == pb,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Epic(id) => write!(f, "epic:{}", id),
            Scope::EpicPhase(id, phase) => write!(f, "epic-phase:{}:{}", id, phase),
        }
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Scope::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Session lifecycle state (spec §4.5 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Suspended,
    Ended,
    Closed,
}

crate::simple_display! {
    SessionStatus {
        Active => "active",
        Suspended => "suspended",
        Ended => "ended",
        Closed => "closed",
    }
}

impl SessionStatus {
    /// Valid transitions out of this state (spec §4.5 diagram).
    pub fn can_transition_to(self, target: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Active, Suspended) | (Active, Ended) | (Suspended, Active) | (Ended, Active) | (Ended, Closed)
        )
    }

    /// Only active sessions may mutate state (spec §4.5 invariants).
    pub fn can_mutate(self) -> bool {
        matches!(self, SessionStatus::Active)
    }
}

/// Confidence level attached to a recorded assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

crate::simple_display! {
    Confidence {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

/// An immutable decision record (spec §4.5 `record.decision`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(rename = "recordedAt")]
    pub recorded_at: String,
    /// Set by a later operation when the decision is no longer open
    /// (used by handoff's `unresolvedDecisions`).
    #[serde(default)]
    pub resolved: bool,
}

/// An assumption record (spec §4.5 `record.assumption`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumptionRecord {
    pub assumption: String,
    pub confidence: Confidence,
    #[serde(rename = "recordedAt")]
    pub recorded_at: String,
}

/// End-of-session summary (spec §4.5 `end`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    #[serde(rename = "openTasks")]
    pub open_tasks: Vec<TaskId>,
    #[serde(rename = "nextRecommendedTask", skip_serializing_if = "Option::is_none")]
    pub next_recommended_task: Option<TaskId>,
    #[serde(rename = "unresolvedDecisions")]
    pub unresolved_decisions: Vec<String>,
    #[serde(rename = "lastTouchedFiles", default, skip_serializing_if = "Option::is_none")]
    pub last_touched_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "nextAction", default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

/// A time-bounded work context (spec §3.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "agentId", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<TaskId>,
    pub status: SessionStatus,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "lastEventAt")]
    pub last_event_at: String,
    #[serde(default, rename = "endedAt", skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub decisions: Vec<DecisionRecord>,
    #[serde(default)]
    pub assumptions: Vec<AssumptionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<Handoff>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
