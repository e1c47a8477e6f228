// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Domain operations (spec §4.4): add, complete, cancel/delete, archive,
//! restore, reparent, reorder, focus, verify. Grounded on
//! `crates/core/src/job.rs`'s state-machine-on-a-struct style and
//! `crates/daemon/src/listener/mutations/*`'s one-handler-per-mutation
//! layout: each operation here loads the current state, builds a candidate,
//! validates it, then commits atomically and appends an audit log line —
//! the six-step discipline spec.md §4.4 spells out for every write op.

use crate::context::ProjectContext;
use crate::state::{ArchiveFile, SessionsFile, TodoFile};
use cleo_core::{
    ArchiveEntry, ArchiveSource, CleoError, Clock, Note, NoteTag, Priority, SessionId, Task, TaskId, TaskSize,
    TaskStatus, TaskType, Verification, GATE_NAMES,
};
use cleo_graph::GraphIndex;
use cleo_validate::{
    coalesce_labels, validate_cancellation_reason, validate_depends_acyclic, validate_depends_exist, validate_depth,
    validate_label, validate_parent_exists, validate_positions_contiguous, validate_title, validate_unique_ids,
};
use std::collections::BTreeSet;

/// Input to [`add`]; everything but `title` is optional and left unset by
/// the caller is filled with the task's default.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub task_type: Option<TaskType>,
    pub size: Option<TaskSize>,
    pub parent_id: Option<TaskId>,
    pub depends: BTreeSet<TaskId>,
    pub labels: Vec<String>,
    pub phase: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AddResult {
    pub task: Option<Task>,
    /// Set instead of `task` when an equivalent task already exists within
    /// the duplicate window (spec §4.4 `add`): no new task is created.
    pub duplicate: Option<TaskId>,
}

/// Load both root documents once per call; every handler needs the archive
/// set for id-uniqueness and depends-satisfaction checks even when it only
/// writes `todo.json`.
fn load_both<C: Clock>(ctx: &ProjectContext<C>) -> Result<(TodoFile, ArchiveFile), CleoError> {
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let archive = ArchiveFile::load(&ctx.store, &ctx.paths.archive_file)?;
    Ok((todo, archive))
}

fn archived_ids(archive: &ArchiveFile) -> BTreeSet<TaskId> {
    archive.archived_tasks.iter().map(|e| e.task.id).collect()
}

/// Run every cross-entity validator spec.md §3.1/§4.2 demands of the live
/// task set, collapsing the violation list into one error.
fn validate_candidate(tasks: &[Task], archive_ids: &BTreeSet<TaskId>, max_depth: u32) -> Result<(), CleoError> {
    let mut violations = Vec::new();
    violations.extend(validate_unique_ids(tasks));
    violations.extend(validate_parent_exists(tasks));
    violations.extend(validate_depends_exist(tasks, archive_ids));
    violations.extend(validate_depends_acyclic(tasks));
    violations.extend(validate_depth(tasks, max_depth));
    violations.extend(validate_positions_contiguous(tasks));
    for t in tasks {
        if t.status == TaskStatus::Blocked && t.description.as_deref().unwrap_or("").trim().is_empty() {
            violations.push(cleo_validate::Violation::new(
                "description",
                "E_INPUT_INVALID",
                format!("{} is blocked but has no description", t.id),
            ));
        }
    }
    if violations.is_empty() {
        return Ok(());
    }
    let joined = violations.iter().map(|v| v.message.clone()).collect::<Vec<_>>().join("; ");
    Err(CleoError::ValidationSchema(joined))
}

fn append_log<C: Clock>(
    ctx: &ProjectContext<C>,
    action: &str,
    actor: &str,
    task_id: Option<TaskId>,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
) -> Result<(), CleoError> {
    let mut entry = cleo_core::LogEntry::new(ctx.clock.now_rfc3339(), action, actor).with_diff(before, after);
    if let Some(id) = task_id {
        entry = entry.with_task(id);
    }
    let value = serde_json::to_value(entry)?;
    ctx.store.append_line(&ctx.paths.log_file, &value, ctx.lock_timeout())?;
    Ok(())
}

fn commit<C: Clock>(
    ctx: &ProjectContext<C>,
    file: &mut TodoFile,
    archive_ids: &BTreeSet<TaskId>,
    action: &str,
    actor: &str,
    task_id: Option<TaskId>,
    before: serde_json::Value,
    after: serde_json::Value,
) -> Result<(), CleoError> {
    validate_candidate(&file.tasks, archive_ids, ctx.config.hierarchy.max_depth)?;
    file.restamp_checksum()?;
    file.last_updated = ctx.clock.now_rfc3339();
    file.save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout())?;
    append_log(ctx, action, actor, task_id, Some(before), Some(after))?;
    Ok(())
}

fn find_task<'a>(tasks: &'a [Task], id: TaskId) -> Result<&'a Task, CleoError> {
    tasks.iter().find(|t| t.id == id).ok_or_else(|| CleoError::TaskNotFound(id.to_string()))
}

fn find_task_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task, CleoError> {
    tasks.iter_mut().find(|t| t.id == id).ok_or_else(|| CleoError::TaskNotFound(id.to_string()))
}

fn parse_epoch_ms(rfc3339: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(rfc3339).ok().map(|dt| dt.timestamp_millis())
}

/// Create a task (spec §4.4 `add`). Returns `{duplicate:existingId}` instead
/// of creating a task when a same-title-and-phase task was added within the
/// configured duplicate window.
pub fn add<C: Clock>(
    ctx: &ProjectContext<C>,
    title: &str,
    opts: AddOptions,
    actor: &str,
) -> Result<AddResult, CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let normalized_title = validate_title(title).map_err(|v| CleoError::InputInvalid(v.message))?;

    let now_ms = ctx.clock.epoch_ms() as i64;
    let window_ms = ctx.config.duplicate.window_seconds as i64 * 1000;
    let duplicate =
        crate::duplicate::find_duplicate(&file.tasks, &normalized_title, opts.phase.as_deref(), now_ms, window_ms);
    if let Some(existing) = duplicate {
        return Ok(AddResult { task: None, duplicate: Some(existing.id) });
    }

    if let Some(parent_id) = opts.parent_id {
        find_task(&file.tasks, parent_id)?;
    }
    let task_type = resolve_task_type(&file.tasks, opts.parent_id, opts.task_type)?;

    let sibling_count = file.tasks.iter().filter(|t| t.parent_id == opts.parent_id).count();
    if sibling_count as u32 >= ctx.config.hierarchy.max_siblings {
        return Err(CleoError::InputInvalid(format!(
            "sibling cap exceeded: max {} under this parent",
            ctx.config.hierarchy.max_siblings
        )));
    }

    let mut labels = BTreeSet::new();
    for label in coalesce_labels(opts.labels) {
        validate_label(&label).map_err(|v| CleoError::InputInvalid(v.message))?;
        labels.insert(label);
    }

    let id = TaskId::next_after(file.tasks.iter().map(|t| &t.id).chain(archive.archived_tasks.iter().map(|e| &e.task.id)));
    let now = ctx.clock.now_rfc3339();
    let task = Task {
        id,
        title: normalized_title,
        description: opts.description,
        status: TaskStatus::Pending,
        priority: opts.priority.unwrap_or_default(),
        task_type,
        size: opts.size,
        parent_id: opts.parent_id,
        depends: opts.depends,
        labels,
        phase: opts.phase,
        position: sibling_count as u32 + 1,
        created_at: now.clone(),
        updated_at: now,
        completed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        notes: Vec::new(),
        verification: Verification::default(),
        relates: Vec::new(),
    };

    file.tasks.push(task.clone());
    let archive_ids = archived_ids(&archive);
    commit(
        ctx,
        &mut file,
        &archive_ids,
        "task.add",
        actor,
        Some(task.id),
        serde_json::Value::Null,
        serde_json::to_value(&task)?,
    )?;
    Ok(AddResult { task: Some(task), duplicate: None })
}

fn resolve_task_type(tasks: &[Task], parent_id: Option<TaskId>, requested: Option<TaskType>) -> Result<TaskType, CleoError> {
    let inferred = match parent_id {
        None => TaskType::Epic,
        Some(parent_id) => match find_task(tasks, parent_id)?.task_type {
            TaskType::Epic => TaskType::Task,
            TaskType::Task => TaskType::Subtask,
            TaskType::Subtask => {
                return Err(CleoError::InvalidParentType(format!("{parent_id} is a subtask and cannot have children")))
            }
        },
    };
    match requested {
        Some(t) if t == inferred => Ok(t),
        Some(t) => Err(CleoError::InvalidParentType(format!(
            "requested type {t} does not match the parent-derived type {inferred}"
        ))),
        None => Ok(inferred),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    pub no_auto_complete: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResult {
    pub task: Task,
    pub auto_completed_parents: Vec<TaskId>,
}

/// Complete a task, climbing parents to auto-complete eligible ancestors
/// (spec §4.4 `complete`, §3.1 auto-complete invariant).
pub fn complete<C: Clock>(
    ctx: &ProjectContext<C>,
    id: TaskId,
    opts: CompleteOptions,
    actor: &str,
) -> Result<CompleteResult, CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;

    {
        let task = find_task(&file.tasks, id)?;
        if task.status == TaskStatus::Done {
            return Err(CleoError::TaskCompleted(id.to_string()));
        }
        for dep in &task.depends {
            let satisfied = archive_ids.contains(dep)
                || file.tasks.iter().any(|t| t.id == *dep && matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled));
            if !satisfied {
                return Err(CleoError::DependencyError(format!("{id} depends on incomplete task {dep}")));
            }
        }
        let incomplete_children = file
            .tasks
            .iter()
            .any(|t| t.parent_id == Some(id) && !matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled));
        if incomplete_children && !opts.no_auto_complete {
            return Err(CleoError::HasChildren(id.to_string()));
        }
    }

    let now = ctx.clock.now_rfc3339();
    let gates = ctx.config.verification.gates.clone();
    {
        let task = find_task_mut(&mut file.tasks, id)?;
        task.status = TaskStatus::Done;
        task.completed_at = Some(now.clone());
        task.updated_at = now.clone();
        task.verification.implemented = true;
        task.verification.recompute_passed(&gates);
    }

    let mut auto_completed = Vec::new();
    let mut cursor = find_task(&file.tasks, id)?.parent_id;
    while let Some(parent_id) = cursor {
        if !ctx.config.hierarchy.auto_complete_parent
            || ctx.config.hierarchy.auto_complete_mode == cleo_core::AutoCompleteMode::Off
        {
            break;
        }
        let eligible = {
            let parent = find_task(&file.tasks, parent_id)?;
            if parent.status == TaskStatus::Done {
                break;
            }
            file.tasks.iter().filter(|t| t.parent_id == Some(parent_id)).all(|t| {
                let terminal = matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled);
                let verified = !ctx.config.verification.require_for_parent_auto_complete
                    || t.status == TaskStatus::Cancelled
                    || t.verification.passed;
                terminal && verified
            })
        };
        if !eligible {
            break;
        }
        let next_parent = {
            let parent = find_task_mut(&mut file.tasks, parent_id)?;
            parent.status = TaskStatus::Done;
            parent.completed_at = Some(now.clone());
            parent.updated_at = now.clone();
            parent.notes.push(Note::new(now.clone(), NoteTag::AutoCompleted, "all children complete"));
            parent.parent_id
        };
        auto_completed.push(parent_id);
        cursor = next_parent;
    }

    let after = serde_json::to_value(find_task(&file.tasks, id)?)?;
    commit(ctx, &mut file, &archive_ids, "task.complete", actor, Some(id), before, after)?;
    Ok(CompleteResult { task: find_task(&file.tasks, id)?.clone(), auto_completed_parents: auto_completed })
}

/// How to treat a cancelled task's children (spec §4.4 `cancel/delete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildrenPolicy {
    Block,
    Cascade,
    Orphan,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CancelResult {
    pub archived: Vec<TaskId>,
}

/// Cancel (and archive) a task, per spec §4.4 `cancel/delete`.
pub fn cancel<C: Clock>(
    ctx: &ProjectContext<C>,
    id: TaskId,
    reason: &str,
    children: ChildrenPolicy,
    force: bool,
    actor: &str,
) -> Result<CancelResult, CleoError> {
    validate_cancellation_reason(reason).map_err(|v| CleoError::InputInvalid(v.message))?;
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;

    {
        let task = find_task(&file.tasks, id)?;
        if task.status == TaskStatus::Cancelled {
            return Err(CleoError::NoChange(id.to_string()));
        }
    }
    let direct_children: Vec<TaskId> = file.tasks.iter().filter(|t| t.parent_id == Some(id)).map(|t| t.id).collect();
    if children == ChildrenPolicy::Block && !direct_children.is_empty() {
        return Err(CleoError::HasChildren(id.to_string()));
    }

    let now = ctx.clock.now_rfc3339();
    let mut to_archive = vec![id];
    if children == ChildrenPolicy::Cascade {
        to_archive.extend(descendants_of(&file.tasks, id));
    } else if children == ChildrenPolicy::Orphan {
        for child in &direct_children {
            if let Ok(t) = find_task_mut(&mut file.tasks, *child) {
                t.parent_id = None;
                t.updated_at = now.clone();
            }
        }
    }

    let source = if force { ArchiveSource::Force } else { ArchiveSource::Manual };
    let mut archive_file = archive;
    for task_id in &to_archive {
        let task = find_task_mut(&mut file.tasks, *task_id)?;
        task.status = TaskStatus::Cancelled;
        task.cancelled_at = Some(now.clone());
        task.cancellation_reason = Some(reason.to_string());
        task.updated_at = now.clone();
        task.notes.push(Note::new(now.clone(), NoteTag::Cancelled, reason));
    }
    for task_id in &to_archive {
        let idx = file
            .tasks
            .iter()
            .position(|t| t.id == *task_id)
            .ok_or_else(|| CleoError::Internal(format!("{task_id} vanished from the in-memory task list")))?;
        let task = file.tasks.remove(idx);
        archive_file.archived_tasks.push(ArchiveEntry::new(task, now.clone(), 0.0, source));
    }

    archive_file.restamp_checksum()?;
    archive_file.save(&ctx.store, &ctx.paths.archive_file, ctx.lock_timeout())?;

    let after = serde_json::json!({ "archived": to_archive });
    let new_archive_ids = archived_ids(&archive_file);
    commit(ctx, &mut file, &new_archive_ids, "task.cancel", actor, Some(id), before, after)?;
    Ok(CancelResult { archived: to_archive })
}

pub(crate) fn descendants_of(tasks: &[Task], root: TaskId) -> Vec<TaskId> {
    let mut out = Vec::new();
    let mut frontier = vec![root];
    while let Some(cur) = frontier.pop() {
        for t in tasks.iter().filter(|t| t.parent_id == Some(cur)) {
            out.push(t.id);
            frontier.push(t.id);
        }
    }
    out
}

/// Archive a single done task (spec §4.4 `archive`).
pub fn archive<C: Clock>(ctx: &ProjectContext<C>, id: TaskId, actor: &str) -> Result<(), CleoError> {
    let (mut file, mut archive_file) = load_both(ctx)?;
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;
    let task = find_task(&file.tasks, id)?;
    if task.status != TaskStatus::Done {
        return Err(CleoError::InputInvalid(format!("{id} is not done; cannot archive")));
    }
    let cycle_time_days = cycle_time_days(task);
    let idx = file
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| CleoError::Internal(format!("{id} vanished from the in-memory task list")))?;
    let task = file.tasks.remove(idx);
    let now = ctx.clock.now_rfc3339();
    archive_file.archived_tasks.push(ArchiveEntry::new(task, now, cycle_time_days, ArchiveSource::Manual));
    archive_file.restamp_checksum()?;
    archive_file.save(&ctx.store, &ctx.paths.archive_file, ctx.lock_timeout())?;

    let archive_ids = archived_ids(&archive_file);
    commit(ctx, &mut file, &archive_ids, "task.archive", actor, Some(id), before, serde_json::Value::Null)?;
    Ok(())
}

fn cycle_time_days(task: &Task) -> f64 {
    match (&task.completed_at, parse_epoch_ms(&task.created_at)) {
        (Some(completed), Some(created)) => {
            let Some(completed_ms) = parse_epoch_ms(completed) else { return 0.0 };
            ((completed_ms - created) as f64 / 86_400_000.0).max(0.0)
        }
        _ => 0.0,
    }
}

/// Sweep done tasks older than `archive.autoAfterDays` into the archive
/// (spec §4.4 `archive auto`). Returns the ids moved.
pub fn archive_auto<C: Clock>(ctx: &ProjectContext<C>, actor: &str) -> Result<Vec<TaskId>, CleoError> {
    let (mut file, mut archive_file) = load_both(ctx)?;
    let now_ms = ctx.clock.epoch_ms() as i64;
    let threshold_ms = ctx.config.archive.auto_after_days as i64 * 86_400_000;

    let eligible: Vec<TaskId> = file
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .filter(|t| {
            t.completed_at
                .as_deref()
                .and_then(parse_epoch_ms)
                .is_some_and(|completed| now_ms - completed >= threshold_ms)
        })
        .map(|t| t.id)
        .collect();

    let now = ctx.clock.now_rfc3339();
    for id in &eligible {
        let idx = file
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| CleoError::Internal(format!("{id} vanished from the in-memory task list")))?;
        let task = file.tasks.remove(idx);
        let cycle = cycle_time_days(&task);
        archive_file.archived_tasks.push(ArchiveEntry::new(task, now.clone(), cycle, ArchiveSource::Auto));
    }
    if eligible.is_empty() {
        return Ok(eligible);
    }
    archive_file.restamp_checksum()?;
    archive_file.save(&ctx.store, &ctx.paths.archive_file, ctx.lock_timeout())?;

    let archive_ids = archived_ids(&archive_file);
    commit(
        ctx,
        &mut file,
        &archive_ids,
        "task.archive_auto",
        actor,
        None,
        serde_json::Value::Null,
        serde_json::json!({ "archived": eligible }),
    )?;
    Ok(eligible)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    pub restored: Vec<Task>,
    /// Requested ids that were already live; skipped, not an error
    /// (spec §4.10 `unarchive`).
    pub already_live: Vec<TaskId>,
    /// Requested ids found in neither the live set nor the archive.
    pub missing: Vec<TaskId>,
}

impl RestoreResult {
    /// True when nothing was actually restored: every requested id was
    /// either already live or missing (spec §4.10 `unarchive`'s
    /// `noChange:true` case).
    pub fn no_change(&self) -> bool {
        self.restored.is_empty()
    }
}

/// Restore archived tasks back to the live set (spec §4.4 `restore`,
/// §4.10 `unarchive`, §3.3: restoration clears `_archive`/`completedAt`;
/// `done` is never a valid restore target). Idempotent across retries:
/// ids already live are skipped with a warning rather than rejected, ids
/// absent from both sets are reported in `missing`, everything else is
/// restored.
pub fn restore<C: Clock>(
    ctx: &ProjectContext<C>,
    ids: &[TaskId],
    status: Option<TaskStatus>,
    preserve_status: bool,
    actor: &str,
) -> Result<RestoreResult, CleoError> {
    if status == Some(TaskStatus::Done) {
        return Err(CleoError::InputInvalid("cannot restore directly into status done".to_string()));
    }
    let (mut file, mut archive_file) = load_both(ctx)?;
    let live_ids: BTreeSet<TaskId> = file.tasks.iter().map(|t| t.id).collect();
    let archive_ids_before = archived_ids(&archive_file);
    let classification = crate::duplicate::classify_restore_targets(&live_ids, &archive_ids_before, ids);

    let now = ctx.clock.now_rfc3339();
    let mut restored = Vec::new();
    for id in &classification.restorable {
        let idx = archive_file
            .archived_tasks
            .iter()
            .position(|e| e.task.id == *id)
            .ok_or_else(|| CleoError::Internal(format!("{id} vanished from the in-memory archive")))?;
        let entry = archive_file.archived_tasks.remove(idx);
        let archived_status = entry.task.status;
        let mut task = entry.into_restored_task();
        task.status = if preserve_status && archived_status != TaskStatus::Done {
            archived_status
        } else {
            status.unwrap_or(TaskStatus::Pending)
        };
        if task.status == TaskStatus::Cancelled {
            task.cancelled_at = None;
            task.cancellation_reason = None;
        }
        task.updated_at = now.clone();
        file.tasks.push(task.clone());
        restored.push(task);
    }

    if restored.is_empty() {
        return Ok(RestoreResult {
            restored,
            already_live: classification.already_live,
            missing: classification.missing,
        });
    }

    archive_file.restamp_checksum()?;
    archive_file.save(&ctx.store, &ctx.paths.archive_file, ctx.lock_timeout())?;

    let archive_ids = archived_ids(&archive_file);
    commit(
        ctx,
        &mut file,
        &archive_ids,
        "task.restore",
        actor,
        None,
        serde_json::Value::Null,
        serde_json::json!({
            "restored": classification.restorable,
            "alreadyLive": classification.already_live,
            "missing": classification.missing,
        }),
    )?;
    Ok(RestoreResult { restored, already_live: classification.already_live, missing: classification.missing })
}

/// Change a task's parent (spec §4.4 `reparent/promote`). New position
/// appends to the end of the new parent's children (SPEC_FULL.md §11.4).
pub fn reparent<C: Clock>(
    ctx: &ProjectContext<C>,
    id: TaskId,
    new_parent: Option<TaskId>,
    actor: &str,
) -> Result<Task, CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;

    let task_type = find_task(&file.tasks, id)?.task_type;
    match (task_type, new_parent) {
        (TaskType::Epic, None) => {}
        (TaskType::Epic, Some(_)) => {
            return Err(CleoError::InvalidParentType("epics cannot have a parent".to_string()))
        }
        (_, None) => {
            return Err(CleoError::InvalidParentType(format!("{task_type} tasks must have a parent")))
        }
        (_, Some(parent_id)) => {
            if parent_id == id {
                return Err(CleoError::InvalidParentType("a task cannot be its own parent".to_string()));
            }
            let parent = find_task(&file.tasks, parent_id)?;
            let expected = match parent.task_type {
                TaskType::Epic => TaskType::Task,
                TaskType::Task => TaskType::Subtask,
                TaskType::Subtask => {
                    return Err(CleoError::InvalidParentType(format!("{parent_id} is a subtask and cannot have children")))
                }
            };
            if expected != task_type {
                return Err(CleoError::InvalidParentType(format!(
                    "{id} is a {task_type}; reparenting under {parent_id} would require it to become a {expected}"
                )));
            }
        }
    }

    let mut candidate = file.tasks.clone();
    let sibling_count = candidate.iter().filter(|t| t.parent_id == new_parent && t.id != id).count();
    {
        let t = candidate
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CleoError::Internal(format!("{id} vanished from the in-memory task list")))?;
        t.parent_id = new_parent;
        t.position = sibling_count as u32 + 1;
    }
    if let Err(cleo_graph::GraphError::CycleDetected(_)) = GraphIndex::build(&candidate) {
        return Err(CleoError::InvalidParentType(format!("reparenting {id} under {new_parent:?} would create a cycle")));
    }

    file.tasks = candidate;
    let now = ctx.clock.now_rfc3339();
    find_task_mut(&mut file.tasks, id)?.updated_at = now;
    let after = serde_json::to_value(find_task(&file.tasks, id)?)?;
    commit(ctx, &mut file, &archive_ids, "task.reparent", actor, Some(id), before, after)?;
    Ok(find_task(&file.tasks, id)?.clone())
}

/// Move a task to a new position among its siblings (spec §4.4 `reorder`).
pub fn reorder<C: Clock>(ctx: &ProjectContext<C>, id: TaskId, position: u32, actor: &str) -> Result<Task, CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;
    let parent_id = find_task(&file.tasks, id)?.parent_id;

    let mut siblings: Vec<TaskId> =
        file.tasks.iter().filter(|t| t.parent_id == parent_id).map(|t| t.id).collect();
    siblings.retain(|&sid| sid != id);
    let target = (position.max(1) as usize - 1).min(siblings.len());
    siblings.insert(target, id);

    let now = ctx.clock.now_rfc3339();
    for (offset, sid) in siblings.iter().enumerate() {
        let t = find_task_mut(&mut file.tasks, *sid)?;
        t.position = offset as u32 + 1;
        t.updated_at = now.clone();
    }

    let after = serde_json::to_value(find_task(&file.tasks, id)?)?;
    commit(ctx, &mut file, &archive_ids, "task.reorder", actor, Some(id), before, after)?;
    Ok(find_task(&file.tasks, id)?.clone())
}

/// Claim focus on a task (spec §4.4 `focus set`, §3.2 invariant: two
/// sessions must not hold the same focus unless the shared-focus policy is
/// enabled). `session_id` is optional: an actor acting outside any session
/// (e.g. a script) may still set the project-level `focus.currentTask`.
pub fn focus_set<C: Clock>(
    ctx: &ProjectContext<C>,
    id: TaskId,
    session_id: Option<SessionId>,
    actor: &str,
) -> Result<(), CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let task = find_task(&file.tasks, id)?;
    let phase = task.phase.clone();

    if let Some(sid) = session_id {
        let mut sessions = SessionsFile::load(&ctx.store, &ctx.paths.sessions_file)?;
        if !ctx.config.multi_session.allow_scope_overlap {
            let already_focused = sessions
                .sessions
                .iter()
                .any(|s| s.id != sid && s.is_active() && s.focus == Some(id));
            if already_focused {
                return Err(CleoError::InputInvalid(format!("{id} is already focused by another active session")));
            }
        }
        let session = sessions.sessions.iter_mut().find(|s| s.id == sid).ok_or_else(|| CleoError::SessionNotFound(sid.to_string()))?;
        session.focus = Some(id);
        session.last_event_at = ctx.clock.now_rfc3339();
        sessions.restamp_checksum()?;
        sessions.save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout())?;
    }

    let before = serde_json::to_value(&file.focus)?;
    file.focus.current_task = Some(id);
    file.focus.current_phase = phase;
    let after = serde_json::to_value(&file.focus)?;
    commit(ctx, &mut file, &archive_ids, "task.focus_set", actor, Some(id), before, after)?;
    Ok(())
}

/// Release focus (spec §4.4 `focus clear`).
pub fn focus_clear<C: Clock>(ctx: &ProjectContext<C>, session_id: Option<SessionId>, actor: &str) -> Result<(), CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);

    if let Some(sid) = session_id {
        let mut sessions = SessionsFile::load(&ctx.store, &ctx.paths.sessions_file)?;
        if let Some(session) = sessions.sessions.iter_mut().find(|s| s.id == sid) {
            session.focus = None;
            session.last_event_at = ctx.clock.now_rfc3339();
            sessions.restamp_checksum()?;
            sessions.save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout())?;
        }
    }

    let before = serde_json::to_value(&file.focus)?;
    file.focus.current_task = None;
    file.focus.current_phase = None;
    let after = serde_json::to_value(&file.focus)?;
    commit(ctx, &mut file, &archive_ids, "task.focus_clear", actor, None, before, after)?;
    Ok(())
}

/// What to update on a task's verification gates (spec §4.4 `verify`).
#[derive(Debug, Clone)]
pub enum VerifyUpdate {
    All(bool),
    Gates(Vec<(String, bool)>),
}

/// Set verification gates, possibly triggering parent auto-complete when
/// every configured gate becomes true (spec §4.4 `verify`).
pub fn verify<C: Clock>(ctx: &ProjectContext<C>, id: TaskId, update: VerifyUpdate, actor: &str) -> Result<Task, CleoError> {
    let (mut file, archive) = load_both(ctx)?;
    let archive_ids = archived_ids(&archive);
    let before = serde_json::to_value(find_task(&file.tasks, id)?)?;

    {
        let task = find_task_mut(&mut file.tasks, id)?;
        match &update {
            VerifyUpdate::All(value) => {
                for gate in GATE_NAMES {
                    task.verification.set_gate(gate, *value);
                }
            }
            VerifyUpdate::Gates(pairs) => {
                for (name, value) in pairs {
                    if !task.verification.set_gate(name, *value) {
                        return Err(CleoError::InputInvalid(format!("unknown verification gate: {name}")));
                    }
                }
            }
        }
        task.verification.recompute_passed(&ctx.config.verification.gates);
        task.updated_at = ctx.clock.now_rfc3339();
    }

    if find_task(&file.tasks, id)?.verification.passed {
        if let Some(parent_id) = find_task(&file.tasks, id)?.parent_id {
            let all_siblings_ready = file.tasks.iter().filter(|t| t.parent_id == Some(parent_id)).all(|t| {
                matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled)
                    && (t.status == TaskStatus::Cancelled || t.verification.passed)
            });
            if all_siblings_ready
                && ctx.config.hierarchy.auto_complete_parent
                && ctx.config.verification.require_for_parent_auto_complete
            {
                let now = ctx.clock.now_rfc3339();
                if let Ok(parent) = find_task_mut(&mut file.tasks, parent_id) {
                    if parent.status != TaskStatus::Done {
                        parent.status = TaskStatus::Done;
                        parent.completed_at = Some(now.clone());
                        parent.updated_at = now.clone();
                        parent.notes.push(Note::new(now, NoteTag::AutoCompleted, "all children verified"));
                    }
                }
            }
        }
    }

    let after = serde_json::to_value(find_task(&file.tasks, id)?)?;
    commit(ctx, &mut file, &archive_ids, "task.verify", actor, Some(id), before, after)?;
    Ok(find_task(&file.tasks, id)?.clone())
}

/// Window for [`archive_stats`]: both bounds are RFC3339 timestamps compared
/// against `_archive.archivedAt`, either side left open by passing `None`.
#[derive(Debug, Clone, Default)]
pub struct ArchiveStatsWindow {
    pub since: Option<String>,
    pub until: Option<String>,
}

impl ArchiveStatsWindow {
    fn contains(&self, archived_at: &str) -> bool {
        self.since.as_deref().is_none_or(|s| archived_at >= s) && self.until.as_deref().is_none_or(|u| archived_at <= u)
    }
}

/// Cycle-time summary shared by the whole-archive total and every breakdown
/// bucket (spec §6.3 `archive-stats --cycle-times`).
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleTimeStats {
    pub count: usize,
    pub mean_days: f64,
    pub min_days: f64,
    pub max_days: f64,
}

impl CycleTimeStats {
    fn from_days(mut days: Vec<f64>) -> Self {
        if days.is_empty() {
            return Self::default();
        }
        days.sort_by(|a, b| a.total_cmp(b));
        let count = days.len();
        let sum: f64 = days.iter().sum();
        Self { count, mean_days: sum / count as f64, min_days: days[0], max_days: days[count - 1] }
    }
}

/// One grouping bucket of [`archive_stats`] (by phase, label or priority).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStatsBucket {
    pub key: String,
    pub cycle_time: CycleTimeStats,
}

/// One month's worth of completions, oldest first (spec §6.3 `--trends`).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveTrendPoint {
    pub month: String,
    pub archived: usize,
    pub cycle_time: CycleTimeStats,
}

/// Aggregate result of [`archive_stats`]; the CLI picks which fields to
/// render per its `--summary`/`--by-phase`/`--by-label`/`--by-priority`/
/// `--cycle-times`/`--trends` flags, but every breakdown is always computed
/// since this is a read-only query over an archive that is rarely large.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total_archived: usize,
    pub cycle_time: CycleTimeStats,
    pub by_phase: Vec<ArchiveStatsBucket>,
    pub by_label: Vec<ArchiveStatsBucket>,
    pub by_priority: Vec<ArchiveStatsBucket>,
    pub trends: Vec<ArchiveTrendPoint>,
}

fn bucket_by<'a>(
    entries: impl Iterator<Item = &'a ArchiveEntry>,
    key: impl Fn(&ArchiveEntry) -> Vec<String>,
) -> Vec<ArchiveStatsBucket> {
    let mut by_key: std::collections::BTreeMap<String, Vec<f64>> = std::collections::BTreeMap::new();
    for entry in entries {
        for k in key(entry) {
            by_key.entry(k).or_default().push(entry.archive.cycle_time_days);
        }
    }
    by_key
        .into_iter()
        .map(|(key, days)| ArchiveStatsBucket { key, cycle_time: CycleTimeStats::from_days(days) })
        .collect()
}

/// Aggregate the archive by phase, label and priority, plus monthly
/// completion trends (spec §6.3 `archive-stats`). `window` restricts which
/// entries count, keyed on `_archive.archivedAt`.
pub fn archive_stats<C: Clock>(ctx: &ProjectContext<C>, window: &ArchiveStatsWindow) -> Result<ArchiveStats, CleoError> {
    let archive_file = ArchiveFile::load(&ctx.store, &ctx.paths.archive_file)?;
    let entries: Vec<&ArchiveEntry> =
        archive_file.archived_tasks.iter().filter(|e| window.contains(&e.archive.archived_at)).collect();

    let total_archived = entries.len();
    let cycle_time = CycleTimeStats::from_days(entries.iter().map(|e| e.archive.cycle_time_days).collect());

    let by_phase = bucket_by(entries.iter().copied(), |e| e.task.phase.clone().into_iter().collect());
    let by_label = bucket_by(entries.iter().copied(), |e| e.task.labels.iter().cloned().collect());
    let by_priority = bucket_by(entries.iter().copied(), |e| vec![e.task.priority.to_string()]);

    let mut by_month: std::collections::BTreeMap<String, Vec<f64>> = std::collections::BTreeMap::new();
    for entry in &entries {
        let month = entry.archive.archived_at.get(0..7).unwrap_or(&entry.archive.archived_at).to_string();
        by_month.entry(month).or_default().push(entry.archive.cycle_time_days);
    }
    let trends = by_month
        .into_iter()
        .map(|(month, days)| ArchiveTrendPoint { month, archived: days.len(), cycle_time: CycleTimeStats::from_days(days) })
        .collect();

    Ok(ArchiveStats { total_archived, cycle_time, by_phase, by_label, by_priority, trends })
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
