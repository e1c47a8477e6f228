// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{Task, TaskType};

fn task(id: u32, parent: Option<u32>, position: u32) -> Task {
    Task::builder()
        .task_type(if parent.is_none() { TaskType::Epic } else { TaskType::Task })
        .position(position)
        .parent_id(parent.map(TaskId::from_number))
        .build_with_id(id)
}

#[test]
fn build_computes_depth_from_hierarchy() {
    let tasks = vec![task(1, None, 1), task(2, Some(1), 1), task(3, Some(2), 1)];
    let idx = GraphIndex::build(&tasks).unwrap();
    assert_eq!(idx.depth(TaskId::from_number(1)), Some(0));
    assert_eq!(idx.depth(TaskId::from_number(2)), Some(1));
    assert_eq!(idx.depth(TaskId::from_number(3)), Some(2));
}

#[test]
fn build_orders_children_by_position() {
    let tasks = vec![
        task(1, None, 1),
        task(3, Some(1), 2),
        task(2, Some(1), 1),
    ];
    let idx = GraphIndex::build(&tasks).unwrap();
    assert_eq!(idx.children_of(TaskId::from_number(1)), &[TaskId::from_number(2), TaskId::from_number(3)]);
}

#[test]
fn build_detects_duplicate_ids() {
    let tasks = vec![task(1, None, 1), task(1, None, 2)];
    assert!(matches!(GraphIndex::build(&tasks), Err(GraphError::DuplicateId(_))));
}

#[test]
fn build_detects_parent_cycle() {
    let mut a = task(1, Some(2), 1);
    let b = task(2, Some(1), 1);
    a.parent_id = Some(TaskId::from_number(2));
    let tasks = vec![a, b];
    assert!(matches!(GraphIndex::build(&tasks), Err(GraphError::CycleDetected(_))));
}

#[test]
fn label_and_phase_indices_group_by_value() {
    let mut t1 = task(1, None, 1);
    t1.labels.insert("backend".to_string());
    t1.phase = Some("design".to_string());
    let mut t2 = task(2, None, 2);
    t2.labels.insert("backend".to_string());

    let idx = GraphIndex::build(&[t1, t2]).unwrap();
    assert_eq!(idx.by_label("backend").len(), 2);
    assert_eq!(idx.by_phase("design").len(), 1);
}

#[test]
fn siblings_of_excludes_self() {
    let tasks = vec![task(1, None, 1), task(2, Some(1), 1), task(3, Some(1), 2)];
    let idx = GraphIndex::build(&tasks).unwrap();
    assert_eq!(idx.siblings_of(TaskId::from_number(2)), vec![TaskId::from_number(3)]);
}
