// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{Scope, Session, SessionId, SessionStatus, TaskType};

fn task(id: u32, parent: Option<u32>, position: u32) -> Task {
    Task::builder()
        .task_type(if parent.is_none() { TaskType::Epic } else { TaskType::Task })
        .position(position)
        .parent_id(parent.map(TaskId::from_number))
        .build_with_id(id)
}

#[test]
fn validate_unique_ids_flags_duplicates() {
    let tasks = vec![task(1, None, 1), task(1, None, 2)];
    assert_eq!(validate_unique_ids(&tasks).len(), 1);
}

#[test]
fn validate_parent_exists_flags_dangling_parent() {
    let mut orphan = task(2, Some(1), 1);
    orphan.parent_id = Some(TaskId::from_number(99));
    assert_eq!(validate_parent_exists(&[orphan]).len(), 1);
}

#[test]
fn validate_depends_exist_allows_archived_deps() {
    let mut t = task(1, None, 1);
    t.depends.insert(TaskId::from_number(50));
    let archived: BTreeSet<TaskId> = [TaskId::from_number(50)].into_iter().collect();
    assert!(validate_depends_exist(&[t], &archived).is_empty());
}

#[test]
fn validate_depends_exist_flags_missing_refs() {
    let mut t = task(1, None, 1);
    t.depends.insert(TaskId::from_number(50));
    assert_eq!(validate_depends_exist(&[t], &BTreeSet::new()).len(), 1);
}

#[test]
fn validate_depends_acyclic_flags_cycles() {
    let mut t1 = task(1, None, 1);
    let mut t2 = task(2, None, 2);
    t1.depends.insert(TaskId::from_number(2));
    t2.depends.insert(TaskId::from_number(1));
    assert_eq!(validate_depends_acyclic(&[t1, t2]).len(), 1);
}

#[test]
fn validate_depth_flags_tasks_beyond_max() {
    let tasks = vec![task(1, None, 1), task(2, Some(1), 1), task(3, Some(2), 1)];
    assert!(validate_depth(&tasks, 1).len() == 1);
    assert!(validate_depth(&tasks, 2).is_empty());
}

#[test]
fn validate_positions_contiguous_flags_gaps() {
    let tasks = vec![task(1, None, 1), task(2, None, 3)];
    assert_eq!(validate_positions_contiguous(&tasks).len(), 1);
}

#[test]
fn validate_positions_contiguous_accepts_sequential() {
    let tasks = vec![task(1, None, 1), task(2, None, 2)];
    assert!(validate_positions_contiguous(&tasks).is_empty());
}

fn session(active: bool, scope: Scope) -> Session {
    Session {
        id: SessionId::generate(0),
        scope,
        name: None,
        agent_id: None,
        focus: None,
        status: if active { SessionStatus::Active } else { SessionStatus::Ended },
        started_at: "2026-01-01T00:00:00Z".to_string(),
        last_event_at: "2026-01-01T00:00:00Z".to_string(),
        ended_at: None,
        note: None,
        decisions: Vec::new(),
        assumptions: Vec::new(),
        handoff: None,
    }
}

#[test]
fn validate_single_active_per_scope_flags_overlap() {
    let sessions = vec![session(true, Scope::Epic(TaskId::from_number(1))), session(true, Scope::Global)];
    assert_eq!(validate_single_active_per_scope(&sessions, false).len(), 1);
}

#[test]
fn validate_single_active_per_scope_allows_when_policy_enabled() {
    let sessions = vec![session(true, Scope::Epic(TaskId::from_number(1))), session(true, Scope::Global)];
    assert!(validate_single_active_per_scope(&sessions, true).is_empty());
}

#[test]
fn validate_single_active_per_scope_ignores_inactive_sessions() {
    let sessions = vec![session(false, Scope::Global), session(true, Scope::Global)];
    assert!(validate_single_active_per_scope(&sessions, false).is_empty());
}
