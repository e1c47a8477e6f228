// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entry(findings: usize) -> ManifestEntry {
    ManifestEntry {
        id: ManifestEntryId::new(),
        file: "agent-outputs/auth-research.md".to_string(),
        title: "Auth provider comparison".to_string(),
        date: "2026-01-01".to_string(),
        status: ManifestStatus::Draft,
        topics: vec!["auth".to_string()],
        key_findings: (0..findings).map(|i| format!("finding {i}")).collect(),
        needs_followup: Vec::new(),
        linked_tasks: Vec::new(),
    }
}

#[test]
fn validate_accepts_three_to_seven_findings() {
    assert!(entry(3).validate().is_ok());
    assert!(entry(7).validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_findings() {
    assert!(entry(2).validate().is_err());
    assert!(entry(8).validate().is_err());
}

#[test]
fn link_task_is_idempotent() {
    let mut e = entry(3);
    let id = TaskId::from_number(9);
    e.link_task(id);
    e.link_task(id);
    assert_eq!(e.linked_tasks, vec![id]);
}

#[test]
fn has_pending_followup_reflects_list() {
    let mut e = entry(3);
    assert!(!e.has_pending_followup());
    e.needs_followup.push(TaskId::from_number(2));
    assert!(e.has_pending_followup());
}
