// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cleo-dispatch: the operation registry, the fixed middleware pipeline, and
//! every domain handler. This is the single routing path spec §4.7
//! describes — `cleo-cli` and `cleo-wire` are both thin clients of
//! [`Dispatcher::dispatch`], and neither carries any business logic of its
//! own.

pub mod admin;
pub mod check;
pub mod context;
mod duplicate;
pub mod manifest;
pub mod middleware;
pub mod nexus;
pub mod pipeline;
pub mod registry;
pub mod sessions;
pub mod state;
pub mod tasks;
pub mod tools;

pub use context::ProjectContext;
pub use middleware::{Envelope, EnvelopeMeta, ErrorPayload, ENGINE_VERSION};
pub use registry::{Domain, Gateway, OperationSpec, REGISTRY};

use cleo_core::{
    CleoError, Clock, Confidence, ManifestEntryId, ManifestStatus, Priority, Scope, SessionId, TaskId, TaskSize,
    TaskStatus, TaskType,
};
use cleo_validate::{Contribution, OrphanPolicy, ProvenanceTag, VoteOption};
use middleware::{err_envelope, ok_envelope, resolve, sanitise, AuditRecord, RateLimiter};
use serde::de::DeserializeOwned;
use serde_json::Value;
use state::{SessionsFile, TodoFile};
use std::time::Instant;
use tasks::{AddOptions, ChildrenPolicy, CompleteOptions, VerifyUpdate};

/// Default token-bucket rate, per gateway (spec §4.7 stage 2).
pub const DEFAULT_RATE_LIMIT_OPS_PER_SEC: u32 = 100;

/// Required value at `params[key]`.
fn param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, CleoError> {
    let value = params.get(key).ok_or_else(|| CleoError::InputMissing(key.to_string()))?;
    serde_json::from_value(value.clone()).map_err(|e| CleoError::InputInvalid(format!("{key}: {e}")))
}

/// Optional value at `params[key]`; absent or `null` is `None`.
fn param_opt<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, CleoError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            serde_json::from_value(value.clone()).map(Some).map_err(|e| CleoError::InputInvalid(format!("{key}: {e}")))
        }
    }
}

fn param_or<T: DeserializeOwned>(params: &Value, key: &str, default: T) -> Result<T, CleoError> {
    Ok(param_opt(params, key)?.unwrap_or(default))
}

fn parse_children_policy(s: &str) -> Result<ChildrenPolicy, CleoError> {
    match s {
        "block" => Ok(ChildrenPolicy::Block),
        "cascade" => Ok(ChildrenPolicy::Cascade),
        "orphan" => Ok(ChildrenPolicy::Orphan),
        other => Err(CleoError::InputInvalid(format!("unknown children policy: {other}"))),
    }
}

fn parse_orphan_policy(s: &str) -> Result<OrphanPolicy, CleoError> {
    match s {
        "unlink" => Ok(OrphanPolicy::Unlink),
        "cancel" => Ok(OrphanPolicy::Cancel),
        other => Err(CleoError::InputInvalid(format!("unknown orphan policy: {other}"))),
    }
}

/// Owns the project context and the per-gateway rate limiter for one
/// process's lifetime; every call to `dispatch` runs the fixed pipeline
/// spec §4.7 describes (registry resolve → rate-limit → sanitise →
/// route → envelope).
pub struct Dispatcher<C: Clock> {
    ctx: ProjectContext<C>,
    limiter: RateLimiter,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(ctx: ProjectContext<C>) -> Self {
        Self { ctx, limiter: RateLimiter::new(DEFAULT_RATE_LIMIT_OPS_PER_SEC) }
    }

    pub fn context(&self) -> &ProjectContext<C> {
        &self.ctx
    }

    /// Run one call through the full dispatch pipeline, never panicking:
    /// every failure mode (unknown operation, missing param, handler error)
    /// comes back as an `Envelope` with `success: false`.
    pub fn dispatch(&self, gateway: Gateway, domain: Domain, operation: &str, params: Value, actor: &str) -> Envelope {
        let started = Instant::now();
        match self.try_dispatch(gateway, domain, operation, &params, actor, started) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(domain = domain.as_str(), operation, error = %err, "dispatch failed");
                err_envelope(gateway, domain, operation, self.ctx.clock.now_rfc3339(), started, &err)
            }
        }
    }

    fn try_dispatch(
        &self,
        gateway: Gateway,
        domain: Domain,
        operation: &str,
        params: &Value,
        actor: &str,
        started: Instant,
    ) -> Result<Envelope, CleoError> {
        let spec = resolve(gateway, domain, operation, params)?;
        let gateway_key = gateway_key(gateway);
        if !self.limiter.allow(gateway_key) {
            return Err(CleoError::RateLimited(gateway_key));
        }
        let params = sanitise(params);
        let data = self.route(domain, operation, &params, actor)?;
        ok_envelope(spec, self.ctx.clock.now_rfc3339(), started, data)
    }

    fn route(&self, domain: Domain, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match domain {
            Domain::Tasks => self.route_tasks(operation, params, actor),
            Domain::Session => self.route_session(operation, params, actor),
            Domain::Memory => self.route_memory(operation, params, actor),
            Domain::Check => self.route_check(operation, params, actor),
            Domain::Pipeline => self.route_pipeline(operation, params),
            Domain::Nexus => self.route_nexus(operation, params),
            Domain::Tools => self.route_tools(operation, params),
            Domain::Admin => self.route_admin(operation, params, actor),
            Domain::Orchestrate => {
                Err(CleoError::InvalidOperation { domain: domain.as_str().to_string(), operation: operation.to_string() })
            }
        }
    }

    fn audit(&self, action: &str, actor: &str, before: Option<Value>, after: Option<Value>) -> Result<(), CleoError> {
        let record = AuditRecord {
            action: action.to_string(),
            actor: actor.to_string(),
            before,
            after,
            success: true,
            duration_ms: 0,
            error_code: None,
        };
        let entry = record.into_log_entry(self.ctx.clock.now_rfc3339(), None);
        let value = serde_json::to_value(entry)?;
        self.ctx.store.append_line(&self.ctx.paths.log_file, &value, self.ctx.lock_timeout())
    }

    fn route_tasks(&self, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match operation {
            "add" => {
                let title: String = param(params, "title")?;
                let opts = AddOptions {
                    description: param_opt(params, "description")?,
                    priority: param_opt::<Priority>(params, "priority")?,
                    task_type: param_opt::<TaskType>(params, "task_type")?,
                    size: param_opt::<TaskSize>(params, "size")?,
                    parent_id: param_opt::<TaskId>(params, "parent_id")?,
                    depends: param_opt(params, "depends")?.unwrap_or_default(),
                    labels: param_opt(params, "labels")?.unwrap_or_default(),
                    phase: param_opt(params, "phase")?,
                };
                Ok(serde_json::to_value(tasks::add(&self.ctx, &title, opts, actor)?)?)
            }
            "list" => {
                let todo = TodoFile::load(&self.ctx.store, &self.ctx.paths.todo_file)?;
                let status: Option<TaskStatus> = param_opt(params, "status")?;
                let task_type: Option<TaskType> = param_opt(params, "type")?;
                let parent_id: Option<TaskId> = param_opt(params, "parent")?;
                let children_of: Option<TaskId> = param_opt(params, "children")?;
                let verification_status: Option<String> = param_opt(params, "verification_status")?;
                let tasks: Vec<_> = todo
                    .tasks
                    .into_iter()
                    .filter(|t| status.is_none_or(|s| t.status == s))
                    .filter(|t| task_type.is_none_or(|ty| t.task_type == ty))
                    .filter(|t| parent_id.as_ref().is_none_or(|p| t.parent_id.as_ref() == Some(p)))
                    .filter(|t| children_of.as_ref().is_none_or(|p| t.parent_id.as_ref() == Some(p)))
                    .filter(|t| {
                        verification_status.as_deref().is_none_or(|vs| {
                            let passed = t.verification.passed;
                            match vs {
                                "passed" => passed,
                                "pending" => !passed,
                                _ => true,
                            }
                        })
                    })
                    .collect();
                Ok(serde_json::to_value(tasks)?)
            }
            "show" => {
                let id: TaskId = param(params, "id")?;
                let todo = TodoFile::load(&self.ctx.store, &self.ctx.paths.todo_file)?;
                let task = todo.tasks.into_iter().find(|t| t.id == id).ok_or_else(|| CleoError::TaskNotFound(id.to_string()))?;
                Ok(serde_json::to_value(task)?)
            }
            "complete" => {
                let id: TaskId = param(params, "id")?;
                let opts = CompleteOptions { no_auto_complete: param_or(params, "no_auto_complete", false)? };
                Ok(serde_json::to_value(tasks::complete(&self.ctx, id, opts, actor)?)?)
            }
            "cancel" => {
                let id: TaskId = param(params, "id")?;
                let reason: String = param(params, "reason")?;
                let children = parse_children_policy(&param_or(params, "children", "block".to_string())?)?;
                let force: bool = param_or(params, "force", false)?;
                Ok(serde_json::to_value(tasks::cancel(&self.ctx, id, &reason, children, force, actor)?)?)
            }
            "archive" => {
                let id: TaskId = param(params, "id")?;
                tasks::archive(&self.ctx, id, actor)?;
                Ok(serde_json::json!({ "id": id }))
            }
            "archive_auto" => Ok(serde_json::to_value(tasks::archive_auto(&self.ctx, actor)?)?),
            "restore" => {
                let ids: Vec<TaskId> = param(params, "ids")?;
                let status: Option<TaskStatus> = param_opt(params, "status")?;
                let preserve_status: bool = param_or(params, "preserve_status", false)?;
                Ok(serde_json::to_value(tasks::restore(&self.ctx, &ids, status, preserve_status, actor)?)?)
            }
            "reparent" => {
                let id: TaskId = param(params, "id")?;
                let new_parent: Option<TaskId> = param_opt(params, "parent_id")?;
                Ok(serde_json::to_value(tasks::reparent(&self.ctx, id, new_parent, actor)?)?)
            }
            "reorder" => {
                let id: TaskId = param(params, "id")?;
                let position: u32 = param(params, "position")?;
                Ok(serde_json::to_value(tasks::reorder(&self.ctx, id, position, actor)?)?)
            }
            "focus_set" => {
                let id: TaskId = param(params, "id")?;
                let session_id: Option<SessionId> = param_opt(params, "session_id")?;
                tasks::focus_set(&self.ctx, id, session_id, actor)?;
                Ok(serde_json::json!({ "id": id }))
            }
            "focus_clear" => {
                let session_id: Option<SessionId> = param_opt(params, "session_id")?;
                tasks::focus_clear(&self.ctx, session_id, actor)?;
                Ok(serde_json::json!({}))
            }
            "verify" => {
                let id: TaskId = param(params, "id")?;
                let update = match param_opt::<bool>(params, "all")? {
                    Some(value) => VerifyUpdate::All(value),
                    None => {
                        let gates: std::collections::BTreeMap<String, bool> = param(params, "gates")?;
                        VerifyUpdate::Gates(gates.into_iter().collect())
                    }
                };
                Ok(serde_json::to_value(tasks::verify(&self.ctx, id, update, actor)?)?)
            }
            "archive_stats" => {
                let window = tasks::ArchiveStatsWindow {
                    since: param_opt(params, "since")?,
                    until: param_opt(params, "until")?,
                };
                Ok(serde_json::to_value(tasks::archive_stats(&self.ctx, &window)?)?)
            }
            other => Err(CleoError::InvalidOperation { domain: "tasks".into(), operation: other.into() }),
        }
    }

    fn route_session(&self, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match operation {
            "start" => {
                let scope_str: String = param(params, "scope")?;
                let scope = Scope::parse(&scope_str).map_err(|e| CleoError::InputInvalid(e.to_string()))?;
                let opts = sessions::StartOptions {
                    name: param_opt(params, "name")?,
                    agent_id: param_opt(params, "agent_id")?,
                    focus: param_opt::<TaskId>(params, "focus")?,
                    auto_focus: param_or(params, "auto_focus", false)?,
                };
                Ok(serde_json::to_value(sessions::start(&self.ctx, scope, opts, actor)?)?)
            }
            "suspend" => {
                let id: SessionId = param(params, "id")?;
                Ok(serde_json::to_value(sessions::suspend(&self.ctx, id, actor)?)?)
            }
            "resume" => {
                let id: SessionId = param(params, "id")?;
                Ok(serde_json::to_value(sessions::resume(&self.ctx, id, actor)?)?)
            }
            "end" => {
                let id: SessionId = param(params, "id")?;
                let note: Option<String> = param_opt(params, "note")?;
                let next_action: Option<String> = param_opt(params, "next_action")?;
                Ok(serde_json::to_value(sessions::end(&self.ctx, id, note, next_action, actor)?)?)
            }
            "gc" => {
                let max_age_days: u32 = param_or(params, "max_age_days", self.ctx.config.archive.auto_after_days)?;
                Ok(serde_json::to_value(sessions::gc(&self.ctx, max_age_days, actor)?)?)
            }
            "list" => {
                let sessions = SessionsFile::load(&self.ctx.store, &self.ctx.paths.sessions_file)?;
                Ok(serde_json::to_value(sessions.sessions)?)
            }
            "show" => {
                let id: SessionId = param(params, "id")?;
                let sessions = SessionsFile::load(&self.ctx.store, &self.ctx.paths.sessions_file)?;
                let session =
                    sessions.sessions.into_iter().find(|s| s.id == id).ok_or_else(|| CleoError::SessionNotFound(id.to_string()))?;
                Ok(serde_json::to_value(session)?)
            }
            "record_decision" => {
                let id: SessionId = param(params, "id")?;
                let decision: String = param(params, "decision")?;
                let rationale: Option<String> = param_opt(params, "rationale")?;
                let alternatives: Vec<String> = param_opt(params, "alternatives")?.unwrap_or_default();
                Ok(serde_json::to_value(sessions::record_decision(&self.ctx, id, decision, rationale, alternatives, actor)?)?)
            }
            "record_assumption" => {
                let id: SessionId = param(params, "id")?;
                let assumption: String = param(params, "assumption")?;
                let confidence: Confidence = param(params, "confidence")?;
                Ok(serde_json::to_value(sessions::record_assumption(&self.ctx, id, assumption, confidence, actor)?)?)
            }
            "context_drift" => {
                let id: SessionId = param(params, "id")?;
                Ok(serde_json::to_value(sessions::context_drift(&self.ctx, id)?)?)
            }
            "handoff_show" => {
                let id: SessionId = param(params, "id")?;
                Ok(serde_json::to_value(sessions::handoff_show(&self.ctx, id)?)?)
            }
            "briefing_show" => {
                let id: SessionId = param(params, "id")?;
                Ok(serde_json::to_value(sessions::briefing_show(&self.ctx, id)?)?)
            }
            other => Err(CleoError::InvalidOperation { domain: "session".into(), operation: other.into() }),
        }
    }

    fn route_memory(&self, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match operation {
            "research_latest" => {
                let limit: usize = param_or(params, "limit", 20)?;
                Ok(serde_json::to_value(manifest::latest(&self.ctx, limit)?)?)
            }
            "research_pending_followups" => Ok(serde_json::to_value(manifest::pending_followups(&self.ctx)?)?),
            "research_by_topic" => {
                let topic: String = param(params, "topic")?;
                Ok(serde_json::to_value(manifest::by_topic(&self.ctx, &topic)?)?)
            }
            "research_by_task" => {
                let task_id: TaskId = param(params, "task_id")?;
                Ok(serde_json::to_value(manifest::by_task(&self.ctx, task_id)?)?)
            }
            "research_record" => {
                let file: String = param(params, "file")?;
                let title: String = param(params, "title")?;
                let key_findings: Vec<String> = param(params, "key_findings")?;
                let opts = manifest::RecordOptions {
                    topics: param_opt(params, "topics")?.unwrap_or_default(),
                    needs_followup: param_opt(params, "needs_followup")?.unwrap_or_default(),
                    linked_tasks: param_opt(params, "linked_tasks")?.unwrap_or_default(),
                    status: param_opt::<ManifestStatus>(params, "status")?,
                };
                let entry = manifest::record(&self.ctx, file, title, key_findings, opts)?;
                self.audit("memory.research_record", actor, None, Some(serde_json::to_value(&entry)?))?;
                Ok(serde_json::to_value(entry)?)
            }
            "research_link" => {
                let task_id: TaskId = param(params, "task_id")?;
                let entry_id: ManifestEntryId = param(params, "entry_id")?;
                let entry = manifest::link(&self.ctx, &entry_id, task_id)?;
                self.audit("memory.research_link", actor, None, Some(serde_json::to_value(&entry)?))?;
                Ok(serde_json::to_value(entry)?)
            }
            other => Err(CleoError::InvalidOperation { domain: "memory".into(), operation: other.into() }),
        }
    }

    fn route_check(&self, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match operation {
            "validate" => {
                let max_depth: u32 = param_or(params, "max_depth", self.ctx.config.hierarchy.max_depth)?;
                Ok(serde_json::to_value(check::validate(&self.ctx, max_depth)?)?)
            }
            "fix_orphans" => {
                let policy = parse_orphan_policy(&param::<String>(params, "policy")?)?;
                Ok(serde_json::to_value(check::fix_orphans(&self.ctx, policy, actor)?)?)
            }
            "fix_positions" => Ok(serde_json::to_value(check::fix_positions(&self.ctx, actor)?)?),
            "fix_checksum" => Ok(serde_json::to_value(check::fix_checksum(&self.ctx, actor)?)?),
            other => Err(CleoError::InvalidOperation { domain: "check".into(), operation: other.into() }),
        }
    }

    fn route_pipeline(&self, operation: &str, params: &Value) -> Result<Value, CleoError> {
        match operation {
            "research" => {
                let entry_id: ManifestEntryId = param(params, "entry_id")?;
                let diff_is_code_only: bool = param_or(params, "diff_is_code_only", false)?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::research(&self.ctx, &entry_id, diff_is_code_only, strict)?)?)
            }
            "consensus" => {
                let options: Vec<VoteOption> = param(params, "options")?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::consensus(&options, strict))?)
            }
            "specification" => {
                let text: String = param(params, "text")?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::specification(&text, strict))?)
            }
            "decomposition" => {
                let children: Vec<String> = param(params, "children")?;
                let sibling_cap: usize = param_or(params, "sibling_cap", self.ctx.config.hierarchy.max_siblings as usize)?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::decomposition(&children, sibling_cap, strict))?)
            }
            "provenance" => {
                let tags: Vec<ProvenanceTag> = param(params, "tags")?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::provenance(&tags, strict))?)
            }
            "release" => {
                let version: String = param(params, "version")?;
                let changelog_entry_present: bool = param_or(params, "changelog_entry_present", false)?;
                let strict: bool = param_or(params, "strict", false)?;
                Ok(serde_json::to_value(pipeline::release(&version, changelog_entry_present, strict))?)
            }
            other => Err(CleoError::InvalidOperation { domain: "pipeline".into(), operation: other.into() }),
        }
    }

    fn route_nexus(&self, operation: &str, params: &Value) -> Result<Value, CleoError> {
        match operation {
            "consensus_vote" => {
                let question_id: String = param(params, "question_id")?;
                let contributions: Vec<Contribution> = param(params, "contributions")?;
                Ok(serde_json::to_value(nexus::consensus_vote(&question_id, &contributions))?)
            }
            "consensus_synthesize" => {
                let contributions: Vec<Contribution> = param(params, "contributions")?;
                Ok(serde_json::to_value(nexus::consensus_synthesize(&contributions))?)
            }
            "conflicts" => {
                let contributions: Vec<Contribution> = param(params, "contributions")?;
                Ok(serde_json::to_value(nexus::conflicts(&contributions))?)
            }
            other => Err(CleoError::InvalidOperation { domain: "nexus".into(), operation: other.into() }),
        }
    }

    fn route_tools(&self, operation: &str, params: &Value) -> Result<Value, CleoError> {
        match operation {
            "related" => {
                let id: TaskId = param(params, "id")?;
                let top_k: usize = param_or(params, "top_k", 5)?;
                let ranked = tools::related_to(&self.ctx, id, top_k)?;
                Ok(serde_json::to_value(
                    ranked.into_iter().map(|(id, score)| serde_json::json!({ "id": id, "score": score })).collect::<Vec<_>>(),
                )?)
            }
            "waves" => Ok(serde_json::to_value(tools::waves(&self.ctx)?)?),
            other => Err(CleoError::InvalidOperation { domain: "tools".into(), operation: other.into() }),
        }
    }

    fn route_admin(&self, operation: &str, params: &Value, actor: &str) -> Result<Value, CleoError> {
        match operation {
            "init" => {
                let report = admin::init(&self.ctx)?;
                self.audit("admin.init", actor, None, Some(serde_json::to_value(&report)?))?;
                Ok(serde_json::to_value(report)?)
            }
            "doctor" => {
                let max_depth: u32 = param_or(params, "max_depth", self.ctx.config.hierarchy.max_depth)?;
                Ok(serde_json::to_value(admin::doctor(&self.ctx, max_depth)?)?)
            }
            other => Err(CleoError::InvalidOperation { domain: "admin".into(), operation: other.into() }),
        }
    }
}

fn gateway_key(gateway: Gateway) -> &'static str {
    match gateway {
        Gateway::Query => "query",
        Gateway::Mutate => "mutate",
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
