// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{Task, TaskStatus, TaskType};

fn task(id: u32, parent: Option<u32>, position: u32) -> Task {
    Task::builder()
        .task_type(if parent.is_none() { TaskType::Epic } else { TaskType::Task })
        .position(position)
        .parent_id(parent.map(TaskId::from_number))
        .build_with_id(id)
}

#[test]
fn check_orphans_unlinks_dangling_parent() {
    let mut tasks = vec![task(2, Some(99), 1)];
    let fixed = check_orphans(&mut tasks, OrphanPolicy::Unlink, "2026-02-01T00:00:00Z");
    assert_eq!(fixed, vec![TaskId::from_number(2)]);
    assert!(tasks[0].parent_id.is_none());
}

#[test]
fn check_orphans_cancels_when_requested() {
    let mut tasks = vec![task(2, Some(99), 1)];
    check_orphans(&mut tasks, OrphanPolicy::Cancel, "2026-02-01T00:00:00Z");
    assert_eq!(tasks[0].status, TaskStatus::Cancelled);
    assert!(tasks[0].cancellation_reason.is_some());
}

#[test]
fn check_orphans_ignores_valid_parents() {
    let mut tasks = vec![task(1, None, 1), task(2, Some(1), 1)];
    let fixed = check_orphans(&mut tasks, OrphanPolicy::Unlink, "2026-02-01T00:00:00Z");
    assert!(fixed.is_empty());
}

#[test]
fn check_positions_renumbers_gaps_while_preserving_order() {
    let mut tasks = vec![task(1, None, 5), task(2, None, 1)];
    let fixed = check_positions(&mut tasks);
    assert_eq!(fixed, 2);
    assert_eq!(tasks[1].position, 1);
    assert_eq!(tasks[0].position, 2);
}

#[test]
fn check_positions_is_noop_when_already_contiguous() {
    let mut tasks = vec![task(1, None, 1), task(2, None, 2)];
    assert_eq!(check_positions(&mut tasks), 0);
}

#[test]
fn check_checksum_detects_match_and_mismatch() {
    assert_eq!(check_checksum("abc", "abc"), ChecksumOutcome::Match);
    assert_eq!(
        check_checksum("abc", "def"),
        ChecksumOutcome::Recomputed { previous: "abc".to_string(), current: "def".to_string() }
    );
}
