// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::tasks::{add, AddOptions};
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths};
use std::time::Duration;

fn ctx(dir: &std::path::Path) -> ProjectContext<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    std::fs::create_dir_all(&paths.root).unwrap();
    ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default())
}

#[test]
fn start_rejects_overlapping_active_scope() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap();
    let err = start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InputInvalid(_)));
}

#[test]
fn start_with_auto_focus_claims_the_recommended_task() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();

    let session = start(
        &ctx,
        Scope::Epic(epic.id),
        StartOptions { auto_focus: true, ..Default::default() },
        "tester",
    )
    .unwrap();
    assert_eq!(session.focus, Some(epic.id));
}

#[test]
fn suspend_then_resume_round_trips_status() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let session = start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap();

    let suspended = suspend(&ctx, session.id, "tester").unwrap();
    assert_eq!(suspended.status, SessionStatus::Suspended);

    let resumed = resume(&ctx, session.id, "tester").unwrap();
    assert_eq!(resumed.status, SessionStatus::Active);
}

#[test]
fn suspend_rejects_non_active_session() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let session = start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap();
    suspend(&ctx, session.id, "tester").unwrap();

    let err = suspend(&ctx, session.id, "tester").unwrap_err();
    assert!(matches!(err, CleoError::InvalidOperation { .. }));
}

#[test]
fn end_computes_handoff_with_open_tasks_and_unresolved_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let session = start(&ctx, Scope::Epic(epic.id), StartOptions::default(), "tester").unwrap();
    record_decision(&ctx, session.id, "use sqlite".to_string(), None, Vec::new(), "tester").unwrap();

    let ended = end(&ctx, session.id, Some("EOD".to_string()), None, "tester").unwrap();
    assert_eq!(ended.status, SessionStatus::Ended);
    let handoff = ended.handoff.unwrap();
    assert_eq!(handoff.open_tasks, vec![epic.id]);
    assert_eq!(handoff.next_recommended_task, Some(epic.id));
    assert_eq!(handoff.unresolved_decisions, vec!["use sqlite".to_string()]);
    assert_eq!(handoff.note, Some("EOD".to_string()));
}

#[test]
fn record_decision_rejects_inactive_session() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let session = start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap();
    suspend(&ctx, session.id, "tester").unwrap();

    let err = record_decision(&ctx, session.id, "x".to_string(), None, Vec::new(), "tester").unwrap_err();
    assert!(matches!(err, CleoError::InvalidOperation { .. }));
}

#[test]
fn gc_closes_idle_ended_sessions_only() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let session = start(&ctx, Scope::Global, StartOptions::default(), "tester").unwrap();
    end(&ctx, session.id, None, None, "tester").unwrap();

    let closed = gc(&ctx, 30, "tester").unwrap();
    assert!(closed.is_empty());

    ctx.clock.advance(Duration::from_secs(31 * 86_400));
    let closed = gc(&ctx, 30, "tester").unwrap();
    assert_eq!(closed, vec![session.id]);
}

#[test]
fn context_drift_flags_vocabulary_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Rework the billing pipeline", AddOptions::default(), "tester").unwrap().task.unwrap();
    let session =
        start(&ctx, Scope::Epic(epic.id), StartOptions { focus: Some(epic.id), ..Default::default() }, "tester")
            .unwrap();
    record_decision(&ctx, session.id, "switch authentication provider".to_string(), None, Vec::new(), "tester")
        .unwrap();

    let report = context_drift(&ctx, session.id).unwrap();
    assert!(report.diverges);
}

#[test]
fn briefing_show_composes_focus_decisions_and_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let epic = add(&ctx, "Epic", AddOptions::default(), "tester").unwrap().task.unwrap();
    let session =
        start(&ctx, Scope::Epic(epic.id), StartOptions { focus: Some(epic.id), ..Default::default() }, "tester")
            .unwrap();
    record_decision(&ctx, session.id, "pick postgres".to_string(), None, Vec::new(), "tester").unwrap();

    let briefing = briefing_show(&ctx, session.id).unwrap();
    assert_eq!(briefing.focus_task.unwrap().id, epic.id);
    assert_eq!(briefing.open_decisions.len(), 1);
    assert!(briefing.latest_handoff.is_none());
}
