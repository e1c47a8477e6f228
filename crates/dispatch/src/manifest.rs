// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manifest/Research Domain operations (spec §4.11): record, link, latest,
//! pending-followups, by-topic, by-task queries over the append-only
//! research/manifest JSONL index. Grounded on the query-over-append-log
//! shape of `crates/storage/src/store.rs::append_line`/`read_lines`, the
//! same discipline `tasks.rs`/`sessions.rs` apply to the audit log.

use crate::context::ProjectContext;
use cleo_core::{CleoError, Clock, ManifestEntry, ManifestEntryId, ManifestStatus, TaskId};

fn load_entries<C: Clock>(ctx: &ProjectContext<C>) -> Result<Vec<ManifestEntry>, CleoError> {
    ctx.store
        .read_lines(&ctx.paths.manifest_file)
        .map_err(CleoError::from)?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(CleoError::from))
        .collect()
}

/// Rewrite the whole manifest index (spec §4.1 treats it as append-only in
/// the common case, but `link` mutates an existing entry in place, so the
/// index must be fully rewritten, same as `todo.json`).
fn save_entries<C: Clock>(ctx: &ProjectContext<C>, entries: &[ManifestEntry]) -> Result<(), CleoError> {
    let lock_timeout = ctx.lock_timeout();
    // Rewriting a JSONL file means truncating first; `append_line` only
    // ever opens in append mode, so drop straight to the filesystem here,
    // matching the crate's "this file is a materialized document, not an
    // event log" treatment for any index that supports in-place edits.
    if let Some(parent) = ctx.paths.manifest_file.parent() {
        std::fs::create_dir_all(parent).map_err(CleoError::Io)?;
    }
    let mut buf = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut buf, entry)?;
        buf.push(b'\n');
    }
    let lock_path = {
        let mut s = ctx.paths.manifest_file.as_os_str().to_os_string();
        s.push(".lock");
        std::path::PathBuf::from(s)
    };
    let _guard = cleo_storage::FileLockGuard::acquire(&lock_path, lock_timeout).map_err(CleoError::from)?;
    std::fs::write(&ctx.paths.manifest_file, buf).map_err(CleoError::Io)?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub topics: Vec<String>,
    pub needs_followup: Vec<TaskId>,
    pub linked_tasks: Vec<TaskId>,
    pub status: Option<ManifestStatus>,
}

/// Append a new research/manifest entry (spec §4.11). Rejects `keyFindings`
/// outside the `3..7` range the research protocol stage requires.
pub fn record<C: Clock>(
    ctx: &ProjectContext<C>,
    file: String,
    title: String,
    key_findings: Vec<String>,
    opts: RecordOptions,
) -> Result<ManifestEntry, CleoError> {
    let entry = ManifestEntry {
        id: ManifestEntryId::new(),
        file,
        title,
        date: ctx.clock.now_rfc3339(),
        status: opts.status.unwrap_or(ManifestStatus::Draft),
        topics: opts.topics,
        key_findings,
        needs_followup: opts.needs_followup,
        linked_tasks: opts.linked_tasks,
    };
    entry.validate().map_err(|e| CleoError::ValidationSchema(e.to_string()))?;

    let mut entries = load_entries(ctx)?;
    entries.push(entry.clone());
    save_entries(ctx, &entries)?;
    Ok(entry)
}

/// Fetch one manifest entry by id (used by the Pipeline Domain's research
/// stage validator, which validates an entry already on record rather than
/// one passed inline).
pub fn find_entry<C: Clock>(ctx: &ProjectContext<C>, entry_id: &ManifestEntryId) -> Result<ManifestEntry, CleoError> {
    load_entries(ctx)?
        .into_iter()
        .find(|e| &e.id == entry_id)
        .ok_or_else(|| CleoError::InputInvalid(format!("manifest entry {entry_id} not found")))
}

/// Link a manifest entry to a task (spec §4.11 `research link <taskId>
/// <entryId>`). Idempotent: linking an already-linked task is a no-op.
pub fn link<C: Clock>(ctx: &ProjectContext<C>, entry_id: &ManifestEntryId, task_id: TaskId) -> Result<ManifestEntry, CleoError> {
    let mut entries = load_entries(ctx)?;
    let entry = entries
        .iter_mut()
        .find(|e| &e.id == entry_id)
        .ok_or_else(|| CleoError::InputInvalid(format!("manifest entry {entry_id} not found")))?;
    entry.link_task(task_id);
    let updated = entry.clone();
    save_entries(ctx, &entries)?;
    Ok(updated)
}

/// Entries in reverse-chronological order (spec §4.11 `latest`, `limit`
/// caps the result).
pub fn latest<C: Clock>(ctx: &ProjectContext<C>, limit: usize) -> Result<Vec<ManifestEntry>, CleoError> {
    let mut entries = load_entries(ctx)?;
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries.truncate(limit);
    Ok(entries)
}

/// Entries with at least one outstanding `needsFollowup` task (spec §4.11
/// `pending followups`).
pub fn pending_followups<C: Clock>(ctx: &ProjectContext<C>) -> Result<Vec<ManifestEntry>, CleoError> {
    Ok(load_entries(ctx)?.into_iter().filter(|e| e.has_pending_followup()).collect())
}

/// Entries tagged with `topic` (case-insensitive, spec §4.11 `by topic`).
pub fn by_topic<C: Clock>(ctx: &ProjectContext<C>, topic: &str) -> Result<Vec<ManifestEntry>, CleoError> {
    let needle = topic.to_lowercase();
    Ok(load_entries(ctx)?.into_iter().filter(|e| e.topics.iter().any(|t| t.to_lowercase() == needle)).collect())
}

/// Entries linked to `task_id` (spec §4.11 `by linked task`).
pub fn by_task<C: Clock>(ctx: &ProjectContext<C>, task_id: TaskId) -> Result<Vec<ManifestEntry>, CleoError> {
    Ok(load_entries(ctx)?.into_iter().filter(|e| e.linked_tasks.contains(&task_id)).collect())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
