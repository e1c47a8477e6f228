// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::Task;
use std::collections::BTreeSet;

fn task(id: &str, title: &str, created_at: &str) -> Task {
    Task::builder().id(id.parse().unwrap()).title(title).created_at(created_at.to_string()).build()
}

#[test]
fn find_duplicate_matches_within_window() {
    let tasks = vec![task("T001", "Write docs", "2026-01-01T00:00:00Z")];
    let now_ms = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:30Z").unwrap().timestamp_millis();
    let found = find_duplicate(&tasks, "Write docs", None, now_ms, 60_000);
    assert_eq!(found.map(|t| t.id), Some("T001".parse().unwrap()));
}

#[test]
fn find_duplicate_ignores_stale_match_outside_window() {
    let tasks = vec![task("T001", "Write docs", "2026-01-01T00:00:00Z")];
    let now_ms = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:02:00Z").unwrap().timestamp_millis();
    assert!(find_duplicate(&tasks, "Write docs", None, now_ms, 60_000).is_none());
}

#[test]
fn find_duplicate_requires_matching_phase() {
    let mut t = task("T001", "Write docs", "2026-01-01T00:00:00Z");
    t.phase = Some("design".to_string());
    let now_ms = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:05Z").unwrap().timestamp_millis();
    assert!(find_duplicate(&[t], "Write docs", None, now_ms, 60_000).is_none());
}

#[test]
fn classify_restore_targets_splits_already_live_missing_and_restorable() {
    let live: BTreeSet<TaskId> = ["T001".parse().unwrap()].into_iter().collect();
    let archived: BTreeSet<TaskId> = ["T002".parse().unwrap()].into_iter().collect();
    let requested = vec!["T001".parse().unwrap(), "T002".parse().unwrap(), "T003".parse().unwrap()];

    let out = classify_restore_targets(&live, &archived, &requested);
    assert_eq!(out.already_live, vec!["T001".parse::<TaskId>().unwrap()]);
    assert_eq!(out.restorable, vec!["T002".parse::<TaskId>().unwrap()]);
    assert_eq!(out.missing, vec!["T003".parse::<TaskId>().unwrap()]);
}
