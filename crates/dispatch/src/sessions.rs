// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Domain operations (spec §4.5): start, suspend, resume, end, gc,
//! record.decision, record.assumption, context.drift, handoff.show,
//! briefing.show. Grounded on the same load/validate/commit shape as
//! `tasks.rs`, specialised to the `SessionsFile` root document.

use crate::context::ProjectContext;
use crate::state::{SessionsFile, TodoFile};
use crate::tasks::descendants_of;
use cleo_core::{
    AssumptionRecord, CleoError, Clock, Confidence, DecisionRecord, Handoff, Scope, Session, SessionId,
    SessionStatus, Task, TaskId, TaskStatus,
};

fn load_sessions<C: Clock>(ctx: &ProjectContext<C>) -> Result<SessionsFile, CleoError> {
    SessionsFile::load(&ctx.store, &ctx.paths.sessions_file)
}

fn save_sessions<C: Clock>(ctx: &ProjectContext<C>, file: &mut SessionsFile) -> Result<(), CleoError> {
    file.restamp_checksum()?;
    file.save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout())
}

fn find_session<'a>(file: &'a SessionsFile, id: SessionId) -> Result<&'a Session, CleoError> {
    file.sessions.iter().find(|s| s.id == id).ok_or_else(|| CleoError::SessionNotFound(id.to_string()))
}

fn find_session_mut(file: &mut SessionsFile, id: SessionId) -> Result<&mut Session, CleoError> {
    file.sessions.iter_mut().find(|s| s.id == id).ok_or_else(|| CleoError::SessionNotFound(id.to_string()))
}

fn append_log<C: Clock>(
    ctx: &ProjectContext<C>,
    action: &str,
    actor: &str,
    session_id: Option<SessionId>,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
) -> Result<(), CleoError> {
    let mut entry = cleo_core::LogEntry::new(ctx.clock.now_rfc3339(), action, actor).with_diff(before, after);
    if let Some(id) = session_id {
        entry = entry.with_session(id);
    }
    let value = serde_json::to_value(entry)?;
    ctx.store.append_line(&ctx.paths.log_file, &value, ctx.lock_timeout())?;
    Ok(())
}

/// Input to [`start`].
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub name: Option<String>,
    pub agent_id: Option<String>,
    pub focus: Option<TaskId>,
    pub auto_focus: bool,
}

/// Start a new session in `scope` (spec §4.5 `start`). Rejects if an active
/// session already claims an overlapping scope, unless
/// `multiSession.allowScopeOverlap` is set.
pub fn start<C: Clock>(ctx: &ProjectContext<C>, scope: Scope, opts: StartOptions, actor: &str) -> Result<Session, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    if !ctx.config.multi_session.allow_scope_overlap
        && sessions.sessions.iter().any(|s| s.is_active() && s.scope.overlaps(&scope))
    {
        return Err(CleoError::InputInvalid(format!("an active session already claims scope {scope}")));
    }

    let now = ctx.clock.now_rfc3339();
    let session = Session {
        id: SessionId::generate(ctx.clock.epoch_ms()),
        scope: scope.clone(),
        name: opts.name,
        agent_id: opts.agent_id,
        focus: None,
        status: SessionStatus::Active,
        started_at: now.clone(),
        last_event_at: now,
        ended_at: None,
        note: None,
        decisions: Vec::new(),
        assumptions: Vec::new(),
        handoff: None,
    };

    sessions.sessions.push(session.clone());
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.start", actor, Some(session.id), None, Some(serde_json::to_value(&session)?))?;

    let focus_target = match (opts.focus, opts.auto_focus) {
        (Some(id), _) => Some(id),
        (None, true) => default_focus_candidate(ctx, &scope)?,
        (None, false) => None,
    };
    if let Some(task_id) = focus_target {
        crate::tasks::focus_set(ctx, task_id, Some(session.id), actor)?;
    }

    let sessions = load_sessions(ctx)?;
    Ok(find_session(&sessions, session.id)?.clone())
}

fn default_focus_candidate<C: Clock>(ctx: &ProjectContext<C>, scope: &Scope) -> Result<Option<TaskId>, CleoError> {
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let candidates = open_tasks_in_scope(&todo.tasks, scope);
    Ok(pick_next_recommended(&todo.tasks, &candidates))
}

/// Transition an active session to `suspended` (spec §4.5 diagram).
pub fn suspend<C: Clock>(ctx: &ProjectContext<C>, id: SessionId, actor: &str) -> Result<Session, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let before = serde_json::to_value(find_session(&sessions, id)?)?;
    let session = find_session_mut(&mut sessions, id)?;
    if !session.status.can_transition_to(SessionStatus::Suspended) {
        return Err(CleoError::InvalidOperation { domain: "session".into(), operation: "suspend".into() });
    }
    session.status = SessionStatus::Suspended;
    session.last_event_at = ctx.clock.now_rfc3339();
    let after = serde_json::to_value(&*session)?;
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.suspend", actor, Some(id), Some(before), Some(after))?;
    Ok(find_session(&sessions, id)?.clone())
}

/// Re-open a `suspended` or `ended` session (spec §4.5 `resume`).
pub fn resume<C: Clock>(ctx: &ProjectContext<C>, id: SessionId, actor: &str) -> Result<Session, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let scope = find_session(&sessions, id)?.scope.clone();
    if !ctx.config.multi_session.allow_scope_overlap
        && sessions.sessions.iter().any(|s| s.id != id && s.is_active() && s.scope.overlaps(&scope))
    {
        return Err(CleoError::InputInvalid(format!("an active session already claims scope {scope}")));
    }

    let before = serde_json::to_value(find_session(&sessions, id)?)?;
    let session = find_session_mut(&mut sessions, id)?;
    if !session.status.can_transition_to(SessionStatus::Active) {
        return Err(CleoError::InvalidOperation { domain: "session".into(), operation: "resume".into() });
    }
    session.status = SessionStatus::Active;
    session.last_event_at = ctx.clock.now_rfc3339();
    let after = serde_json::to_value(&*session)?;
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.resume", actor, Some(id), Some(before), Some(after))?;
    Ok(find_session(&sessions, id)?.clone())
}

/// End a session, computing its handoff (spec §4.5 `end`). Handoff
/// computation failure is non-fatal: the session still transitions to
/// `ended` with an empty handoff if the todo file can't be read.
pub fn end<C: Clock>(
    ctx: &ProjectContext<C>,
    id: SessionId,
    note: Option<String>,
    next_action: Option<String>,
    actor: &str,
) -> Result<Session, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let before = serde_json::to_value(find_session(&sessions, id)?)?;

    let handoff = compute_handoff(ctx, &sessions, id, note.clone(), next_action.clone()).unwrap_or_default();

    let session = find_session_mut(&mut sessions, id)?;
    if !session.status.can_transition_to(SessionStatus::Ended) {
        return Err(CleoError::InvalidOperation { domain: "session".into(), operation: "end".into() });
    }
    let now = ctx.clock.now_rfc3339();
    session.status = SessionStatus::Ended;
    session.ended_at = Some(now.clone());
    session.last_event_at = now;
    session.note = note;
    session.handoff = Some(handoff);

    let after = serde_json::to_value(&*session)?;
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.end", actor, Some(id), Some(before), Some(after))?;
    Ok(find_session(&sessions, id)?.clone())
}

fn compute_handoff<C: Clock>(
    ctx: &ProjectContext<C>,
    sessions: &SessionsFile,
    id: SessionId,
    note: Option<String>,
    next_action: Option<String>,
) -> Result<Handoff, CleoError> {
    let session = find_session(sessions, id)?;
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let open = open_tasks_in_scope(&todo.tasks, &session.scope);
    let next_recommended_task = pick_next_recommended(&todo.tasks, &open);
    let unresolved_decisions =
        session.decisions.iter().filter(|d| !d.resolved).map(|d| d.decision.clone()).collect();
    Ok(Handoff {
        open_tasks: open,
        next_recommended_task,
        unresolved_decisions,
        last_touched_files: None,
        note,
        next_action,
    })
}

fn open_tasks_in_scope(tasks: &[Task], scope: &Scope) -> Vec<TaskId> {
    let in_scope = |t: &Task| match scope {
        Scope::Global => true,
        Scope::Epic(epic_id) => t.id == *epic_id || descendants_of(tasks, *epic_id).contains(&t.id),
        Scope::EpicPhase(epic_id, phase) => {
            (t.id == *epic_id || descendants_of(tasks, *epic_id).contains(&t.id)) && t.phase.as_deref() == Some(phase)
        }
    };
    tasks
        .iter()
        .filter(|t| in_scope(t) && !matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled))
        .map(|t| t.id)
        .collect()
}

/// Highest-priority, lowest-position open task: the handoff/auto-focus
/// recommendation heuristic (spec §4.5 `end`, SPEC_FULL.md §10 `start
/// --auto-focus`).
fn pick_next_recommended(tasks: &[Task], open: &[TaskId]) -> Option<TaskId> {
    open.iter()
        .filter_map(|id| tasks.iter().find(|t| t.id == *id))
        .max_by(|a, b| a.priority.cmp(&b.priority).then(b.position.cmp(&a.position)))
        .map(|t| t.id)
}

/// Close `ended` sessions idle longer than `max_age_days` (spec §4.5 `gc`).
/// Only `ended` sessions are eligible: the state diagram has no direct
/// `suspended → closed` transition.
pub fn gc<C: Clock>(ctx: &ProjectContext<C>, max_age_days: u32, actor: &str) -> Result<Vec<SessionId>, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let now_ms = ctx.clock.epoch_ms() as i64;
    let threshold_ms = max_age_days as i64 * 86_400_000;

    let mut closed = Vec::new();
    for session in &mut sessions.sessions {
        if session.status != SessionStatus::Ended {
            continue;
        }
        let idle_ms = chrono::DateTime::parse_from_rfc3339(&session.last_event_at)
            .map(|dt| now_ms - dt.timestamp_millis())
            .unwrap_or(0);
        if idle_ms >= threshold_ms {
            session.status = SessionStatus::Closed;
            session.last_event_at = ctx.clock.now_rfc3339();
            closed.push(session.id);
        }
    }
    if closed.is_empty() {
        return Ok(closed);
    }
    save_sessions(ctx, &mut sessions)?;
    append_log(
        ctx,
        "session.gc",
        actor,
        None,
        None,
        Some(serde_json::json!({ "closed": closed })),
    )?;
    Ok(closed)
}

/// Append an immutable decision record (spec §4.5 `record.decision`). Only
/// an `active` session may mutate state.
pub fn record_decision<C: Clock>(
    ctx: &ProjectContext<C>,
    id: SessionId,
    decision: String,
    rationale: Option<String>,
    alternatives: Vec<String>,
    actor: &str,
) -> Result<DecisionRecord, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let session = find_session_mut(&mut sessions, id)?;
    if !session.status.can_mutate() {
        return Err(CleoError::InvalidOperation { domain: "session".into(), operation: "record.decision".into() });
    }
    let record =
        DecisionRecord { decision, rationale, alternatives, recorded_at: ctx.clock.now_rfc3339(), resolved: false };
    session.decisions.push(record.clone());
    session.last_event_at = ctx.clock.now_rfc3339();
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.record_decision", actor, Some(id), None, Some(serde_json::to_value(&record)?))?;
    Ok(record)
}

/// Append an assumption record (spec §4.5 `record.assumption`).
pub fn record_assumption<C: Clock>(
    ctx: &ProjectContext<C>,
    id: SessionId,
    assumption: String,
    confidence: Confidence,
    actor: &str,
) -> Result<AssumptionRecord, CleoError> {
    let mut sessions = load_sessions(ctx)?;
    let session = find_session_mut(&mut sessions, id)?;
    if !session.status.can_mutate() {
        return Err(CleoError::InvalidOperation { domain: "session".into(), operation: "record.assumption".into() });
    }
    let record = AssumptionRecord { assumption, confidence, recorded_at: ctx.clock.now_rfc3339() };
    session.assumptions.push(record.clone());
    session.last_event_at = ctx.clock.now_rfc3339();
    save_sessions(ctx, &mut sessions)?;
    append_log(ctx, "session.record_assumption", actor, Some(id), None, Some(serde_json::to_value(&record)?))?;
    Ok(record)
}

/// Advisory divergence report (spec §4.5 `context.drift`): does the
/// session's recorded decisions still share any vocabulary with its
/// current focus task?
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DriftReport {
    pub diverges: bool,
    pub reasons: Vec<String>,
}

pub fn context_drift<C: Clock>(ctx: &ProjectContext<C>, id: SessionId) -> Result<DriftReport, CleoError> {
    let sessions = load_sessions(ctx)?;
    let session = find_session(&sessions, id)?;
    let Some(focus) = session.focus else {
        return Ok(DriftReport { diverges: false, reasons: vec!["no task focused".into()] });
    };
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let Some(task) = todo.tasks.iter().find(|t| t.id == focus) else {
        return Ok(DriftReport { diverges: true, reasons: vec![format!("focused task {focus} no longer exists")] });
    };

    let task_words = word_set(&task.title);
    let mut reasons = Vec::new();
    for decision in session.decisions.iter().rev().take(5) {
        let decision_words = word_set(&decision.decision);
        if task_words.is_disjoint(&decision_words) {
            reasons.push(format!("decision {:?} shares no vocabulary with {}", decision.decision, task.title));
        }
    }
    Ok(DriftReport { diverges: !reasons.is_empty(), reasons })
}

fn word_set(text: &str) -> std::collections::HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).filter(|w| w.len() > 3).collect()
}

/// Read-only end-of-session summary accessor (spec §4.5 `end`'s stored
/// handoff, surfaced via `handoff.show`).
pub fn handoff_show<C: Clock>(ctx: &ProjectContext<C>, id: SessionId) -> Result<Option<Handoff>, CleoError> {
    let sessions = load_sessions(ctx)?;
    Ok(find_session(&sessions, id)?.handoff.clone())
}

/// Read-only composition of the current focus task, open decisions, and the
/// latest handoff of the session's scope (SPEC_FULL.md §10 `briefing.show`;
/// never mutates state).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Briefing {
    pub focus_task: Option<Task>,
    pub open_decisions: Vec<DecisionRecord>,
    pub latest_handoff: Option<Handoff>,
}

pub fn briefing_show<C: Clock>(ctx: &ProjectContext<C>, id: SessionId) -> Result<Briefing, CleoError> {
    let sessions = load_sessions(ctx)?;
    let session = find_session(&sessions, id)?;
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let focus_task = session.focus.and_then(|fid| todo.tasks.iter().find(|t| t.id == fid).cloned());
    let open_decisions = session.decisions.iter().filter(|d| !d.resolved).cloned().collect();
    let latest_handoff = sessions
        .sessions
        .iter()
        .filter(|s| s.scope.overlaps(&session.scope) && s.handoff.is_some())
        .max_by(|a, b| a.last_event_at.cmp(&b.last_event_at))
        .and_then(|s| s.handoff.clone());
    Ok(Briefing { focus_task, open_decisions, latest_handoff })
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
