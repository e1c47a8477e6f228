// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The operation registry (spec §4.7): a single data-driven table every
//! adapter (CLI, RPC gateway) looks up through. Grounded on the
//! one-tagged-enum-per-surface discipline of the teacher's
//! `oj-wire::query`/`oj-wire::response`, generalized into a data table
//! because CLEO needs genuinely dynamic dispatch — the CLI auto-registers
//! its domain-namespaced subcommands from this table (spec §4.8) rather
//! than hand-enumerating one `Query`/`Response` variant per RPC.

/// Which RPC surface an operation is reachable from (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gateway {
    Query,
    Mutate,
}

/// The domain an operation belongs to (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Tasks,
    Session,
    Memory,
    Check,
    Pipeline,
    Orchestrate,
    Tools,
    Admin,
    Nexus,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Tasks => "tasks",
            Domain::Session => "session",
            Domain::Memory => "memory",
            Domain::Check => "check",
            Domain::Pipeline => "pipeline",
            Domain::Orchestrate => "orchestrate",
            Domain::Tools => "tools",
            Domain::Admin => "admin",
            Domain::Nexus => "nexus",
        }
    }
}

/// Error returned when a domain name from an adapter (wire, CLI) doesn't
/// match any known domain.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown domain: {0}")]
pub struct UnknownDomain(pub String);

impl std::str::FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks" => Ok(Domain::Tasks),
            "session" => Ok(Domain::Session),
            "memory" => Ok(Domain::Memory),
            "check" => Ok(Domain::Check),
            "pipeline" => Ok(Domain::Pipeline),
            "orchestrate" => Ok(Domain::Orchestrate),
            "tools" => Ok(Domain::Tools),
            "admin" => Ok(Domain::Admin),
            "nexus" => Ok(Domain::Nexus),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

/// One row of the registry: everything an adapter needs to validate a call
/// and route it, without knowing anything about the handler's internals.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub gateway: Gateway,
    pub domain: Domain,
    pub operation: &'static str,
    pub required_params: &'static [&'static str],
    pub description: &'static str,
}

/// The full set of operations reachable through dispatch. Both adapters
/// (spec §4.8 CLI, §4.9 RPC gateway) resolve every call against this table
/// — no business logic lives in either adapter.
pub const REGISTRY: &[OperationSpec] = &[
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "add", required_params: &["title"], description: "Create a task" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Tasks, operation: "list", required_params: &[], description: "List live tasks" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Tasks, operation: "show", required_params: &["id"], description: "Show one task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "complete", required_params: &["id"], description: "Complete a task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "cancel", required_params: &["id", "reason"], description: "Cancel/delete a task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "archive", required_params: &["id"], description: "Archive a done task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "archive_auto", required_params: &[], description: "Archive eligible done tasks" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "restore", required_params: &["ids"], description: "Restore tasks from archive" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "reparent", required_params: &["id", "parent_id"], description: "Change a task's parent" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "reorder", required_params: &["id", "position"], description: "Change a task's position" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "focus_set", required_params: &["id"], description: "Claim focus on a task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "focus_clear", required_params: &[], description: "Release focus" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Tasks, operation: "verify", required_params: &["id"], description: "Set verification gates" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Tasks, operation: "archive_stats", required_params: &[], description: "Aggregate archived tasks by phase, label, priority and cycle time" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "start", required_params: &["scope"], description: "Start a session" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "suspend", required_params: &["id"], description: "Suspend a session" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "resume", required_params: &["id"], description: "Resume a session" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "end", required_params: &["id"], description: "End a session and compute handoff" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "gc", required_params: &[], description: "Close sessions idle beyond threshold" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Session, operation: "list", required_params: &[], description: "List sessions" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Session, operation: "show", required_params: &["id"], description: "Show one session" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "record_decision", required_params: &["id", "decision"], description: "Append a decision record" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Session, operation: "record_assumption", required_params: &["id", "assumption", "confidence"], description: "Append an assumption record" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Session, operation: "context_drift", required_params: &["id"], description: "Advisory scope-drift check" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Session, operation: "handoff_show", required_params: &["id"], description: "Show a session's handoff" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Session, operation: "briefing_show", required_params: &["id"], description: "Composed focus/decisions/handoff summary" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Memory, operation: "research_latest", required_params: &[], description: "Most recent research entries" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Memory, operation: "research_pending_followups", required_params: &[], description: "Research entries with open followups" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Memory, operation: "research_by_topic", required_params: &["topic"], description: "Research entries matching a topic" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Memory, operation: "research_by_task", required_params: &["task_id"], description: "Research entries linked to a task" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Memory, operation: "research_record", required_params: &["file", "title", "key_findings"], description: "Append a research entry" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Memory, operation: "research_link", required_params: &["task_id", "entry_id"], description: "Link a research entry to a task" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Check, operation: "validate", required_params: &[], description: "Run cross-entity validators" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Check, operation: "fix_orphans", required_params: &["policy"], description: "Auto-repair dangling parents" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Check, operation: "fix_positions", required_params: &[], description: "Auto-repair position gaps" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Check, operation: "fix_checksum", required_params: &[], description: "Auto-repair checksum drift" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "research", required_params: &["entry_id"], description: "Research-stage protocol validator" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "consensus", required_params: &["options"], description: "Consensus-stage protocol validator" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "specification", required_params: &["text"], description: "Specification-stage protocol validator" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "decomposition", required_params: &["children"], description: "Decomposition-stage protocol validator" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "provenance", required_params: &["tags"], description: "Implementation/contribution-stage protocol validator" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Pipeline, operation: "release", required_params: &["version"], description: "Release-stage protocol validator" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Nexus, operation: "consensus_vote", required_params: &["question_id", "contributions"], description: "Tally a contribution vote" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Nexus, operation: "consensus_synthesize", required_params: &["contributions"], description: "Detect conflicts and synthesize a decision" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Nexus, operation: "conflicts", required_params: &["contributions"], description: "Detect pairwise conflicts between contributions" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Tools, operation: "related", required_params: &["id"], description: "Find related tasks by label/phase/hierarchy" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Tools, operation: "waves", required_params: &[], description: "Dependency-wave scheduling order" },
    OperationSpec { gateway: Gateway::Mutate, domain: Domain::Admin, operation: "init", required_params: &[], description: "Initialise a project root" },
    OperationSpec { gateway: Gateway::Query, domain: Domain::Admin, operation: "doctor", required_params: &[], description: "Diagnose project-root health" },
];

/// Look up a registry row by domain + operation name.
pub fn find(domain: Domain, operation: &str) -> Option<&'static OperationSpec> {
    REGISTRY.iter().find(|op| op.domain == domain && op.operation == operation)
}

/// Validate that `params` (object keys present) satisfies `spec.required_params`.
pub fn missing_params(spec: &OperationSpec, params: &serde_json::Value) -> Vec<&'static str> {
    spec.required_params
        .iter()
        .copied()
        .filter(|name| params.get(name).is_none())
        .collect()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
