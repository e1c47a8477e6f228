// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_task_is_pending_medium_task() {
    let t = Task::default();
    assert_eq!(t.status, TaskStatus::Pending);
    assert_eq!(t.priority, Priority::Medium);
    assert_eq!(t.task_type, TaskType::Task);
    assert_eq!(t.id.to_string(), "T001");
}

#[test]
fn builder_overrides_fields() {
    let t = Task::builder()
        .title("Do the thing")
        .status(TaskStatus::Blocked)
        .description("needs a blocker description")
        .build_with_id(7);
    assert_eq!(t.title, "Do the thing");
    assert_eq!(t.status, TaskStatus::Blocked);
    assert_eq!(t.description.as_deref(), Some("needs a blocker description"));
    assert_eq!(t.id.to_string(), "T007");
}

#[test]
fn verification_passed_defaults_to_all_five_gates() {
    let mut v = Verification::default();
    assert!(!v.passed);
    for name in GATE_NAMES {
        v.set_gate(name, true);
    }
    v.recompute_passed(&[]);
    assert!(v.passed);
}

#[test]
fn verification_passed_honors_configured_subset() {
    let mut v = Verification::default();
    v.set_gate("implemented", true);
    v.set_gate("testsPassed", true);
    let configured = vec!["implemented".to_string(), "testsPassed".to_string()];
    v.recompute_passed(&configured);
    assert!(v.passed);
}

#[test]
fn task_type_expected_depth_matches_hierarchy() {
    assert_eq!(TaskType::Epic.expected_depth(), 0);
    assert_eq!(TaskType::Task.expected_depth(), 1);
    assert_eq!(TaskType::Subtask.expected_depth(), 2);
}

#[test]
fn note_renders_with_tag_and_timestamp() {
    let n = Note::new("2026-01-01T00:00:00Z", NoteTag::Cancelled, "scope change");
    assert_eq!(n.render(), "[CANCELLED 2026-01-01T00:00:00Z] scope change");
}

#[test]
fn task_roundtrips_through_json() {
    let t = Task::default();
    let json = serde_json::to_string(&t).unwrap();
    let back: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(t, back);
}

#[test]
fn task_is_terminal_for_done_and_cancelled_only() {
    let mut t = Task::default();
    assert!(!t.is_terminal());
    t.status = TaskStatus::Done;
    assert!(t.is_terminal());
    t.status = TaskStatus::Cancelled;
    assert!(t.is_terminal());
    t.status = TaskStatus::Blocked;
    assert!(!t.is_terminal());
}
