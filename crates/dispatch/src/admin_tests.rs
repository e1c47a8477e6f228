// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, ProjectPaths, Task, TaskType};

fn ctx(dir: &std::path::Path) -> ProjectContext<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default())
}

#[test]
fn init_creates_fresh_project_root() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());

    let report = init(&ctx).unwrap();
    assert!(report.created_root);
    assert!(report.created_todo);
    assert!(report.created_archive);
    assert!(report.created_sessions);
    assert!(report.created_config);
    assert!(ctx.paths.config_file.exists());
    assert!(ctx.paths.agent_outputs_dir.is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    init(&ctx).unwrap();

    let second = init(&ctx).unwrap();
    assert!(!second.created_root);
    assert!(!second.created_todo);
    assert!(!second.created_archive);
    assert!(!second.created_sessions);
    assert!(!second.created_config);
}

#[test]
fn doctor_reports_missing_config_before_init() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    std::fs::create_dir_all(&ctx.paths.root).unwrap();

    let findings = doctor(&ctx, 3).unwrap();
    assert!(findings.iter().any(|f| f.code == "E_FILE_NOT_FOUND"));
}

#[test]
fn doctor_reports_checksum_drift() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    init(&ctx).unwrap();

    let mut todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file).unwrap();
    todo.tasks.push(
        Task::builder()
            .id("T001".parse().unwrap())
            .title("drift me")
            .task_type(TaskType::Epic)
            .position(1)
            .created_at("2026-01-01T00:00:00Z".to_string())
            .build(),
    );
    todo.meta.checksum = Some("bogus".to_string());
    todo.save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout()).unwrap();

    let findings = doctor(&ctx, 3).unwrap();
    assert!(findings.iter().any(|f| f.message.contains("checksum drift")));
}

#[test]
fn doctor_is_clean_on_freshly_initialised_root() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    init(&ctx).unwrap();

    let findings = doctor(&ctx, 3).unwrap();
    assert!(findings.is_empty());
}
