// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths};

fn ctx(dir: &std::path::Path) -> ProjectContext<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    std::fs::create_dir_all(&paths.root).unwrap();
    ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default())
}

fn findings(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("finding {i}")).collect()
}

#[test]
fn record_rejects_out_of_range_key_findings() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let err = record(&ctx, "notes.md".to_string(), "Auth survey".to_string(), findings(1), RecordOptions::default())
        .unwrap_err();
    assert!(matches!(err, CleoError::ValidationSchema(_)));
}

#[test]
fn record_then_latest_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let entry = record(
        &ctx,
        "notes.md".to_string(),
        "Auth survey".to_string(),
        findings(4),
        RecordOptions { topics: vec!["auth".to_string()], ..Default::default() },
    )
    .unwrap();

    let entries = latest(&ctx, 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, entry.id);
}

#[test]
fn link_attaches_task_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let entry =
        record(&ctx, "notes.md".to_string(), "Auth survey".to_string(), findings(3), RecordOptions::default())
            .unwrap();
    let task_id: TaskId = "T001".parse().unwrap();

    let linked = link(&ctx, &entry.id, task_id).unwrap();
    assert_eq!(linked.linked_tasks, vec![task_id]);

    let linked_again = link(&ctx, &entry.id, task_id).unwrap();
    assert_eq!(linked_again.linked_tasks, vec![task_id]);
}

#[test]
fn link_unknown_entry_errors() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let bogus = ManifestEntryId::new();
    let err = link(&ctx, &bogus, "T001".parse().unwrap()).unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}

#[test]
fn pending_followups_filters_entries_with_open_followup() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    record(
        &ctx,
        "a.md".to_string(),
        "A".to_string(),
        findings(3),
        RecordOptions { needs_followup: vec!["T001".parse().unwrap()], ..Default::default() },
    )
    .unwrap();
    record(&ctx, "b.md".to_string(), "B".to_string(), findings(3), RecordOptions::default()).unwrap();

    let pending = pending_followups(&ctx).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].file, "a.md");
}

#[test]
fn by_topic_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    record(
        &ctx,
        "a.md".to_string(),
        "A".to_string(),
        findings(3),
        RecordOptions { topics: vec!["Auth".to_string()], ..Default::default() },
    )
    .unwrap();

    let found = by_topic(&ctx, "auth").unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn by_task_finds_linked_entries() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let entry =
        record(&ctx, "a.md".to_string(), "A".to_string(), findings(3), RecordOptions::default()).unwrap();
    let task_id: TaskId = "T001".parse().unwrap();
    link(&ctx, &entry.id, task_id).unwrap();

    let found = by_task(&ctx, task_id).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, entry.id);
}
