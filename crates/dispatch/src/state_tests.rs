// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{Scope, Session, SessionId, SessionStatus, Task};
use std::time::Duration;

fn session(id_seed: u64, scope: Scope, status: SessionStatus) -> Session {
    Session {
        id: SessionId::generate(id_seed),
        scope,
        name: None,
        agent_id: None,
        focus: None,
        status,
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
fn load_missing_file_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("backups"));
    let loaded = TodoFile::load(&store, &dir.path().join("todo.json")).unwrap();
    assert!(loaded.tasks.is_empty());
}

#[test]
fn save_then_load_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("backups"));
    let path = dir.path().join("todo.json");

    let mut file = TodoFile { tasks: vec![Task::default()], ..Default::default() };
    file.restamp_checksum().unwrap();
    file.save(&store, &path, Duration::from_secs(1)).unwrap();

    let loaded = TodoFile::load(&store, &path).unwrap();
    assert_eq!(loaded.tasks.len(), 1);
    assert!(loaded.meta.checksum.is_some());
}

#[test]
fn checksum_is_stable_across_task_order() {
    let t1 = Task::builder().build_with_id(1);
    let t2 = Task::builder().build_with_id(2);

    let mut a = TodoFile { tasks: vec![t1.clone(), t2.clone()], ..Default::default() };
    let mut b = TodoFile { tasks: vec![t2, t1], ..Default::default() };
    a.restamp_checksum().unwrap();
    b.restamp_checksum().unwrap();
    assert_eq!(a.meta.checksum, b.meta.checksum);
}

#[test]
fn sessions_file_save_then_load_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("backups"));
    let path = dir.path().join("sessions.json");

    let mut file = SessionsFile {
        sessions: vec![session(1, Scope::Global, SessionStatus::Active)],
        ..Default::default()
    };
    file.restamp_checksum().unwrap();
    file.save(&store, &path, Duration::from_secs(1)).unwrap();

    let loaded = SessionsFile::load(&store, &path).unwrap();
    assert_eq!(loaded.sessions.len(), 1);
    assert!(loaded.meta.checksum.is_some());
}

#[test]
fn active_elsewhere_detects_overlapping_active_session() {
    let other = session(1, Scope::Epic(cleo_core::TaskId::from_number(1)), SessionStatus::Active);
    let file = SessionsFile { sessions: vec![other.clone()], ..Default::default() };
    assert!(file.active_elsewhere(&Scope::Global, &SessionId::generate(2)));
    assert!(!file.active_elsewhere(&Scope::Global, &other.id));
}

#[test]
fn active_elsewhere_ignores_non_overlapping_or_inactive_sessions() {
    let suspended = session(1, Scope::Global, SessionStatus::Suspended);
    let disjoint = session(2, Scope::Epic(cleo_core::TaskId::from_number(9)), SessionStatus::Active);
    let file = SessionsFile { sessions: vec![suspended, disjoint], ..Default::default() };
    assert!(!file.active_elsewhere(&Scope::Epic(cleo_core::TaskId::from_number(1)), &SessionId::generate(3)));
}
