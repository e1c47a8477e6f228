// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths, TaskId};

fn ctx(dir: &std::path::Path) -> ProjectContext<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    std::fs::create_dir_all(&paths.root).unwrap();
    ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default())
}

#[test]
fn add_creates_root_epic_when_no_parent_given() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let result = add(&ctx, "Ship the thing", AddOptions::default(), "tester").unwrap();
    let task = result.task.unwrap();
    assert_eq!(task.task_type, cleo_core::TaskType::Epic);
    assert_eq!(task.id, TaskId::from_number(1));
    assert!(result.duplicate.is_none());
}

#[test]
fn add_infers_task_type_from_parent() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let task = add(
        &ctx,
        "Child task",
        AddOptions { parent_id: Some(epic.id), ..Default::default() },
        "tester",
    )
    .unwrap()
    .task
    .unwrap();
    assert_eq!(task.task_type, cleo_core::TaskType::Task);

    let subtask = add(
        &ctx,
        "Child subtask",
        AddOptions { parent_id: Some(task.id), ..Default::default() },
        "tester",
    )
    .unwrap()
    .task
    .unwrap();
    assert_eq!(subtask.task_type, cleo_core::TaskType::Subtask);

    let err = add(
        &ctx,
        "Too deep",
        AddOptions { parent_id: Some(subtask.id), ..Default::default() },
        "tester",
    )
    .unwrap_err();
    assert!(matches!(err, CleoError::InvalidParentType(_)));
}

#[test]
fn add_detects_duplicate_within_window() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let first = add(&ctx, "Write docs", AddOptions::default(), "tester").unwrap().task.unwrap();
    let second = add(&ctx, "Write docs", AddOptions::default(), "tester").unwrap();
    assert!(second.task.is_none());
    assert_eq!(second.duplicate, Some(first.id));
}

#[test]
fn add_rejects_blank_title() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let err = add(&ctx, "   ", AddOptions::default(), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}

#[test]
fn complete_requires_children_done_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    add(&ctx, "Child", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap();

    let err = complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap_err();
    assert!(matches!(err, CleoError::HasChildren(_)));

    let forced = complete(&ctx, epic.id, CompleteOptions { no_auto_complete: true }, "tester").unwrap();
    assert_eq!(forced.task.status, cleo_core::TaskStatus::Done);
}

#[test]
fn complete_blocks_on_incomplete_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let blocker = add(&ctx, "Blocker", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester")
        .unwrap()
        .task
        .unwrap();
    let mut depends = std::collections::BTreeSet::new();
    depends.insert(blocker.id);
    let dependent = add(
        &ctx,
        "Dependent",
        AddOptions { parent_id: Some(epic.id), depends, ..Default::default() },
        "tester",
    )
    .unwrap()
    .task
    .unwrap();

    let err = complete(&ctx, dependent.id, CompleteOptions::default(), "tester").unwrap_err();
    assert!(matches!(err, CleoError::DependencyError(_)));

    complete(&ctx, blocker.id, CompleteOptions::default(), "tester").unwrap();
    complete(&ctx, dependent.id, CompleteOptions::default(), "tester").unwrap();
}

#[test]
fn complete_auto_completes_eligible_parent() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PolicyConfig::default();
    config.hierarchy.auto_complete_parent = true;
    let paths = ProjectPaths::resolve(dir.path(), |_| None);
    std::fs::create_dir_all(&paths.root).unwrap();
    let ctx = ProjectContext::new(paths, config, FakeClock::default());

    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let only_child =
        add(&ctx, "Only child", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester")
            .unwrap()
            .task
            .unwrap();

    let result = complete(&ctx, only_child.id, CompleteOptions::default(), "tester").unwrap();
    assert_eq!(result.auto_completed_parents, vec![epic.id]);
}

#[test]
fn cancel_requires_reason_and_blocks_on_children_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    add(&ctx, "Child", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap();

    let err = cancel(&ctx, epic.id, "too short", ChildrenPolicy::Block, false, "tester").unwrap_err();
    assert!(matches!(err, CleoError::HasChildren(_)));

    let err = cancel(&ctx, epic.id, "no", ChildrenPolicy::Cascade, false, "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}

#[test]
fn cancel_cascade_archives_descendants() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let child =
        add(&ctx, "Child", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap().task.unwrap();
    add(&ctx, "Grandchild", AddOptions { parent_id: Some(child.id), ..Default::default() }, "tester").unwrap();

    let result = cancel(&ctx, epic.id, "scope changed entirely", ChildrenPolicy::Cascade, false, "tester").unwrap();
    assert_eq!(result.archived.len(), 3);
}

#[test]
fn archive_then_restore_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, epic.id, "tester").unwrap();

    let err = archive(&ctx, epic.id, "tester").unwrap_err();
    assert!(matches!(err, CleoError::TaskNotFound(_)));

    let restored = restore(&ctx, &[epic.id], None, false, "tester").unwrap();
    assert_eq!(restored.restored.len(), 1);
    assert_eq!(restored.restored[0].status, cleo_core::TaskStatus::Pending);
}

#[test]
fn archive_stats_aggregates_by_phase_label_and_priority() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(
        &ctx,
        "Epic",
        AddOptions { phase: Some("launch".to_string()), labels: vec!["infra".to_string()], ..Default::default() },
        "tester",
    )
    .unwrap()
    .task
    .unwrap();
    complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, epic.id, "tester").unwrap();

    let other = add(
        &ctx,
        "Other epic",
        AddOptions { phase: Some("launch".to_string()), labels: vec!["docs".to_string()], ..Default::default() },
        "tester",
    )
    .unwrap()
    .task
    .unwrap();
    complete(&ctx, other.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, other.id, "tester").unwrap();

    let stats = archive_stats(&ctx, &ArchiveStatsWindow::default()).unwrap();
    assert_eq!(stats.total_archived, 2);
    assert_eq!(stats.cycle_time.count, 2);
    assert_eq!(stats.by_phase.len(), 1);
    assert_eq!(stats.by_phase[0].key, "launch");
    assert_eq!(stats.by_phase[0].cycle_time.count, 2);
    let labels: Vec<&str> = stats.by_label.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(labels, vec!["docs", "infra"]);
    assert_eq!(stats.by_priority.len(), 1);
    assert_eq!(stats.trends.len(), 1);
    assert_eq!(stats.trends[0].archived, 2);
}

#[test]
fn archive_stats_window_filters_on_archived_at() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, epic.id, "tester").unwrap();

    let future_window = ArchiveStatsWindow { since: Some("2999-01-01T00:00:00Z".to_string()), until: None };
    let stats = archive_stats(&ctx, &future_window).unwrap();
    assert_eq!(stats.total_archived, 0);

    let open_window = ArchiveStatsWindow::default();
    let stats = archive_stats(&ctx, &open_window).unwrap();
    assert_eq!(stats.total_archived, 1);
}

#[test]
fn restore_is_idempotent_on_already_live_and_missing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, epic.id, "tester").unwrap();
    let restored = restore(&ctx, &[epic.id], None, false, "tester").unwrap();
    assert_eq!(restored.restored.len(), 1);

    // epic.id is live now; retrying is a no-op, not an error (spec §4.10 `unarchive`).
    let retry = restore(&ctx, &[epic.id], None, false, "tester").unwrap();
    assert!(retry.no_change());
    assert_eq!(retry.already_live, vec![epic.id]);

    let missing_id: TaskId = "T999".parse().unwrap();
    let missing = restore(&ctx, &[missing_id], None, false, "tester").unwrap();
    assert!(missing.no_change());
    assert_eq!(missing.missing, vec![missing_id]);
}

#[test]
fn restore_rejects_done_status_target() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    complete(&ctx, epic.id, CompleteOptions::default(), "tester").unwrap();
    archive(&ctx, epic.id, "tester").unwrap();

    let err = restore(&ctx, &[epic.id], Some(cleo_core::TaskStatus::Done), false, "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}

#[test]
fn reparent_rejects_cycle_and_type_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let task =
        add(&ctx, "Task", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap().task.unwrap();
    let subtask =
        add(&ctx, "Subtask", AddOptions { parent_id: Some(task.id), ..Default::default() }, "tester").unwrap().task.unwrap();

    let err = reparent(&ctx, epic.id, Some(subtask.id), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InvalidParentType(_)));

    let err = reparent(&ctx, task.id, Some(task.id), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InvalidParentType(_)));
}

#[test]
fn reorder_moves_task_among_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let a = add(&ctx, "A", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap().task.unwrap();
    let b = add(&ctx, "B", AddOptions { parent_id: Some(epic.id), ..Default::default() }, "tester").unwrap().task.unwrap();
    assert_eq!(a.position, 1);
    assert_eq!(b.position, 2);

    let moved = reorder(&ctx, b.id, 1, "tester").unwrap();
    assert_eq!(moved.position, 1);
    let (mut file, _) = load_both(&ctx).unwrap();
    file.tasks.sort_by_key(|t| t.position);
    assert_eq!(file.tasks.iter().find(|t| t.id == a.id).unwrap().position, 2);
}

#[test]
fn focus_set_blocks_cross_session_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();

    let session_a = SessionId::generate(1);
    let session_b = SessionId::generate(2);
    let mut sessions = SessionsFile::load(&ctx.store, &ctx.paths.sessions_file).unwrap();
    sessions.sessions.push(cleo_core::Session {
        id: session_a,
        scope: cleo_core::Scope::Global,
        name: None,
        agent_id: None,
        focus: None,
        status: cleo_core::SessionStatus::Active,
        started_at: ctx.clock.now_rfc3339(),
        last_event_at: ctx.clock.now_rfc3339(),
        ended_at: None,
        note: None,
        decisions: Vec::new(),
        assumptions: Vec::new(),
        handoff: None,
    });
    sessions.sessions.push(cleo_core::Session {
        id: session_b,
        scope: cleo_core::Scope::Global,
        name: None,
        agent_id: None,
        focus: None,
        status: cleo_core::SessionStatus::Active,
        started_at: ctx.clock.now_rfc3339(),
        last_event_at: ctx.clock.now_rfc3339(),
        ended_at: None,
        note: None,
        decisions: Vec::new(),
        assumptions: Vec::new(),
        handoff: None,
    });
    sessions.restamp_checksum().unwrap();
    sessions.save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout()).unwrap();

    focus_set(&ctx, epic.id, Some(session_a), "tester").unwrap();
    let mut reloaded = SessionsFile::load(&ctx.store, &ctx.paths.sessions_file).unwrap();
    reloaded.sessions.iter_mut().find(|s| s.id == session_a).unwrap().focus = Some(epic.id);
    reloaded.restamp_checksum().unwrap();
    reloaded.save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout()).unwrap();

    let err = focus_set(&ctx, epic.id, Some(session_b), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));

    focus_clear(&ctx, Some(session_a), "tester").unwrap();
    focus_set(&ctx, epic.id, Some(session_b), "tester").unwrap();
}

#[test]
fn verify_sets_gates_and_rejects_unknown_gate() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();

    let updated = verify(&ctx, epic.id, VerifyUpdate::All(true), "tester").unwrap();
    assert!(updated.verification.passed);

    let err = verify(&ctx, epic.id, VerifyUpdate::Gates(vec![("bogus".to_string(), true)]), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}
