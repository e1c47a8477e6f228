// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check Domain operations (spec §4.7 Check): run the cross-entity
//! validators read-only, or auto-repair what `validate --fix-*` targets.
//! Grounded on `tasks.rs`'s load/candidate/commit shape; `fix_orphans` and
//! `fix_positions` reuse `cleo_validate::repair` the same way `tasks.rs`
//! reuses `cleo_validate::cross`.

use crate::context::ProjectContext;
use crate::state::{ArchiveFile, TodoFile};
use cleo_core::{CleoError, Clock};
use cleo_validate::{
    check_checksum, validate_depends_acyclic, validate_depends_exist, validate_depth, validate_parent_exists,
    validate_positions_contiguous, validate_unique_ids, ChecksumOutcome, OrphanPolicy, Violation,
};
use std::collections::BTreeSet;

fn archived_ids(archive: &ArchiveFile) -> BTreeSet<cleo_core::TaskId> {
    archive.archived_tasks.iter().map(|e| e.task.id).collect()
}

/// Run every cross-entity validator over the live task set (spec §4.2,
/// `check.validate`). Read-only: never mutates `todo.json`.
pub fn validate<C: Clock>(ctx: &ProjectContext<C>, max_depth: u32) -> Result<Vec<Violation>, CleoError> {
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let archive = ArchiveFile::load(&ctx.store, &ctx.paths.archive_file)?;
    let archive_ids = archived_ids(&archive);

    let mut violations = Vec::new();
    violations.extend(validate_unique_ids(&todo.tasks));
    violations.extend(validate_parent_exists(&todo.tasks));
    violations.extend(validate_depends_exist(&todo.tasks, &archive_ids));
    violations.extend(validate_depends_acyclic(&todo.tasks));
    violations.extend(validate_depth(&todo.tasks, max_depth));
    violations.extend(validate_positions_contiguous(&todo.tasks));
    Ok(violations)
}

fn append_log<C: Clock>(ctx: &ProjectContext<C>, action: &str, actor: &str, after: serde_json::Value) -> Result<(), CleoError> {
    let entry = cleo_core::LogEntry::new(ctx.clock.now_rfc3339(), action, actor).with_diff(None, Some(after));
    let value = serde_json::to_value(entry)?;
    ctx.store.append_line(&ctx.paths.log_file, &value, ctx.lock_timeout())?;
    Ok(())
}

/// Auto-repair tasks whose `parentId` points nowhere (spec §4.2
/// `validate --fix-orphans`).
pub fn fix_orphans<C: Clock>(ctx: &ProjectContext<C>, policy: OrphanPolicy, actor: &str) -> Result<Vec<cleo_core::TaskId>, CleoError> {
    let mut todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let now = ctx.clock.now_rfc3339();
    let fixed = cleo_validate::check_orphans(&mut todo.tasks, policy, &now);
    if fixed.is_empty() {
        return Ok(fixed);
    }
    todo.restamp_checksum()?;
    todo.last_updated = now;
    todo.save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout())?;
    append_log(ctx, "check.fix_orphans", actor, serde_json::json!({ "fixed": fixed }))?;
    Ok(fixed)
}

/// Renumber positions within each parent group back to a contiguous
/// `1..=N` sequence (spec §4.2 `validate --fix-positions`). Returns the
/// number of tasks renumbered.
pub fn fix_positions<C: Clock>(ctx: &ProjectContext<C>, actor: &str) -> Result<usize, CleoError> {
    let mut todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let fixed = cleo_validate::check_positions(&mut todo.tasks);
    if fixed == 0 {
        return Ok(0);
    }
    todo.restamp_checksum()?;
    todo.last_updated = ctx.clock.now_rfc3339();
    todo.save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout())?;
    append_log(ctx, "check.fix_positions", actor, serde_json::json!({ "fixed": fixed }))?;
    Ok(fixed)
}

/// Recompute `todo.json`'s task checksum and restamp `_meta.checksum` if it
/// disagrees with what's stored (spec §4.2 `validate --fix-checksum`).
pub fn fix_checksum<C: Clock>(ctx: &ProjectContext<C>, actor: &str) -> Result<ChecksumOutcome, CleoError> {
    let mut todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let mut sorted = todo.tasks.clone();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    let computed = cleo_storage::compute_checksum(&sorted)?;
    let stored = todo.meta.checksum.clone().unwrap_or_default();
    let outcome = check_checksum(&stored, &computed);
    if let ChecksumOutcome::Recomputed { .. } = &outcome {
        todo.meta.checksum = Some(computed);
        todo.save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout())?;
        append_log(ctx, "check.fix_checksum", actor, serde_json::json!({ "previous": stored }))?;
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
