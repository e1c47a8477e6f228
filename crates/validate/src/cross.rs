// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-entity validators: pure functions from a candidate state to a
//! violation list (spec §4.2). Every mutation builds a candidate copy and
//! commits only if this list is empty.

use crate::fields::Violation;
use cleo_core::{Session, Task, TaskId};
use cleo_graph::{dependency_waves, GraphError, GraphIndex};
use std::collections::BTreeSet;

/// Every task id must be unique across the live set passed in.
pub fn validate_unique_ids(tasks: &[Task]) -> Vec<Violation> {
    let mut seen = BTreeSet::new();
    let mut violations = Vec::new();
    for t in tasks {
        if !seen.insert(t.id) {
            violations.push(Violation::new("id", "E_ID_COLLISION", format!("duplicate task id: {}", t.id)));
        }
    }
    violations
}

/// `parentId`, when set, must reference an existing live task.
pub fn validate_parent_exists(tasks: &[Task]) -> Vec<Violation> {
    let ids: BTreeSet<TaskId> = tasks.iter().map(|t| t.id).collect();
    tasks
        .iter()
        .filter_map(|t| t.parent_id)
        .filter(|p| !ids.contains(p))
        .map(|p| Violation::new("parentId", "E_TASK_NOT_FOUND", format!("parent not found: {p}")))
        .collect()
}

/// Every `depends` entry must exist in the live set or the archived id set
/// (archived deps are treated as satisfied, spec §3.1).
pub fn validate_depends_exist(tasks: &[Task], archived_ids: &BTreeSet<TaskId>) -> Vec<Violation> {
    let live_ids: BTreeSet<TaskId> = tasks.iter().map(|t| t.id).collect();
    let mut violations = Vec::new();
    for t in tasks {
        for dep in &t.depends {
            if !live_ids.contains(dep) && !archived_ids.contains(dep) {
                violations.push(Violation::new(
                    "depends",
                    "E_TASK_NOT_FOUND",
                    format!("{} depends on missing task {}", t.id, dep),
                ));
            }
        }
    }
    violations
}

/// `depends` must form a DAG within the live set.
pub fn validate_depends_acyclic(tasks: &[Task]) -> Vec<Violation> {
    match dependency_waves(tasks) {
        Ok(_) => Vec::new(),
        Err(GraphError::CycleDetected(ids)) => {
            let members = ids.iter().map(TaskId::to_string).collect::<Vec<_>>().join(", ");
            vec![Violation::new("depends", "E_DEPENDENCY_ERROR", format!("dependency cycle: {members}"))]
        }
        Err(GraphError::DuplicateId(id)) => {
            vec![Violation::new("id", "E_ID_COLLISION", format!("duplicate task id: {id}"))]
        }
    }
}

/// No task may sit deeper than `max_depth` below its root epic.
pub fn validate_depth(tasks: &[Task], max_depth: u32) -> Vec<Violation> {
    let Ok(idx) = GraphIndex::build(tasks) else {
        return Vec::new(); // structural errors already reported by other validators
    };
    tasks
        .iter()
        .filter_map(|t| idx.depth(t.id).map(|d| (t, d)))
        .filter(|(_, d)| *d > max_depth)
        .map(|(t, d)| {
            Violation::new("parentId", "E_DEPTH_EXCEEDED", format!("{} at depth {d} exceeds max {max_depth}", t.id))
        })
        .collect()
}

/// Positions within each parent group (including the root group, keyed by
/// "no parent") must be a contiguous `1..=N` sequence.
pub fn validate_positions_contiguous(tasks: &[Task]) -> Vec<Violation> {
    use std::collections::BTreeMap;
    let mut groups: BTreeMap<Option<TaskId>, Vec<u32>> = BTreeMap::new();
    for t in tasks {
        groups.entry(t.parent_id).or_default().push(t.position);
    }
    let mut violations = Vec::new();
    for (parent, mut positions) in groups {
        positions.sort_unstable();
        let expected: Vec<u32> = (1..=positions.len() as u32).collect();
        if positions != expected {
            let label = parent.map(|p| p.to_string()).unwrap_or_else(|| "root".to_string());
            violations.push(Violation::new(
                "position",
                "E_VALIDATION_SCHEMA",
                format!("positions under {label} are not contiguous: {positions:?}"),
            ));
        }
    }
    violations
}

/// At most one session per overlapping scope may be `active`, unless the
/// multi-session overlap policy is enabled (spec §4.5).
pub fn validate_single_active_per_scope(sessions: &[Session], allow_overlap: bool) -> Vec<Violation> {
    if allow_overlap {
        return Vec::new();
    }
    let active: Vec<&Session> = sessions.iter().filter(|s| s.is_active()).collect();
    let mut violations = Vec::new();
    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            if active[i].scope.overlaps(&active[j].scope) {
                violations.push(Violation::new(
                    "scope",
                    "E_INPUT_INVALID",
                    format!("sessions {} and {} have overlapping active scopes", active[i].id, active[j].id),
                ));
            }
        }
    }
    violations
}

#[cfg(test)]
#[path = "cross_tests.rs"]
mod tests;
