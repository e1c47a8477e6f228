// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(clap::Subcommand)]
enum SessionCommand {
    /// Start a session on a scope, e.g. `task:CLEO-12` or `phase:launch`
    Start {
        scope: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        agent_id: Option<String>,
        #[arg(long)]
        focus: Option<String>,
        #[arg(long)]
        auto_focus: bool,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Suspend a session
    Suspend {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Resume a suspended session
    Resume {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// End a session and compute its handoff
    End {
        id: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        next_action: Option<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Close sessions idle beyond a threshold
    Gc {
        #[arg(long)]
        max_age_days: Option<u32>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// List sessions
    List {
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Show one session
    Show {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Session history is the session's own record; alias of `show`
    History {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Record a decision against a session
    Record(RecordArgs),
    /// Advisory scope-drift check
    ContextDrift {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Show a session's handoff
    HandoffShow {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Composed focus/decisions/handoff summary
    BriefingShow {
        id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

#[derive(clap::Args)]
struct RecordArgs {
    #[command(subcommand)]
    kind: RecordKind,
}

#[derive(clap::Subcommand)]
enum RecordKind {
    /// Append a decision record
    Decision {
        id: String,
        decision: String,
        #[arg(long)]
        rationale: Option<String>,
        #[arg(long, value_delimiter = ',')]
        alternatives: Vec<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Append an assumption record
    Assumption {
        id: String,
        assumption: String,
        /// One of high, medium, low
        confidence: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

pub fn run<C: Clock>(dispatcher: &Dispatcher<C>, args: SessionArgs) -> Result<i32, ExitError> {
    match args.command {
        SessionCommand::Start { scope, name, agent_id, focus, auto_focus, format } => {
            let scope_display = scope.clone();
            let params = serde_json::json!({
                "scope": scope,
                "name": name,
                "agent_id": agent_id,
                "focus": focus,
                "auto_focus": auto_focus,
            });
            let envelope = crate::call(dispatcher, Domain::Session, "start", params);
            render(&envelope, format, |data| {
                println!("{} started on {}", crate::color::literal(data["id"].as_str().unwrap_or("?")), scope_display);
            })
        }
        SessionCommand::Suspend { id, format } => {
            let id_display = id.clone();
            let envelope = crate::call(dispatcher, Domain::Session, "suspend", serde_json::json!({ "id": id }));
            render(&envelope, format, |_| println!("{id_display} suspended"))
        }
        SessionCommand::Resume { id, format } => {
            let id_display = id.clone();
            let envelope = crate::call(dispatcher, Domain::Session, "resume", serde_json::json!({ "id": id }));
            render(&envelope, format, |_| println!("{id_display} resumed"))
        }
        SessionCommand::End { id, note, next_action, format } => {
            let id_display = id.clone();
            let params = serde_json::json!({ "id": id, "note": note, "next_action": next_action });
            let envelope = crate::call(dispatcher, Domain::Session, "end", params);
            render(&envelope, format, |_| println!("{id_display} ended"))
        }
        SessionCommand::Gc { max_age_days, format } => {
            let params = serde_json::json!({ "max_age_days": max_age_days });
            let envelope = crate::call(dispatcher, Domain::Session, "gc", params);
            render(&envelope, format, |data| {
                let closed = data.as_array().map(|a| a.len()).unwrap_or(0);
                println!("{closed} session(s) closed");
            })
        }
        SessionCommand::List { format } => {
            let envelope = crate::call(dispatcher, Domain::Session, "list", serde_json::json!({}));
            render(&envelope, format, |data| {
                let sessions = data.as_array().cloned().unwrap_or_default();
                if sessions.is_empty() {
                    println!("no sessions");
                    return;
                }
                for session in &sessions {
                    println!(
                        "{}  {}  {}",
                        crate::color::literal(session["id"].as_str().unwrap_or("?")),
                        session["status"].as_str().unwrap_or("?"),
                        crate::color::muted(session["scope"].as_str().unwrap_or("")),
                    );
                }
            })
        }
        SessionCommand::Show { id, format } | SessionCommand::History { id, format } => {
            let id_display = id.clone();
            let envelope = crate::call(dispatcher, Domain::Session, "show", serde_json::json!({ "id": id }));
            render(&envelope, format, |data| {
                println!("{}", crate::color::header(data["id"].as_str().unwrap_or(&id_display)));
                println!("status: {}", data["status"].as_str().unwrap_or("?"));
                println!("scope: {}", data["scope"].as_str().unwrap_or("?"));
            })
        }
        SessionCommand::Record(record) => run_record(dispatcher, record),
        SessionCommand::ContextDrift { id, format } => {
            let envelope = crate::call(dispatcher, Domain::Session, "context_drift", serde_json::json!({ "id": id }));
            render(&envelope, format, |data| println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()))
        }
        SessionCommand::HandoffShow { id, format } => {
            let envelope = crate::call(dispatcher, Domain::Session, "handoff_show", serde_json::json!({ "id": id }));
            render(&envelope, format, |data| println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()))
        }
        SessionCommand::BriefingShow { id, format } => {
            let envelope = crate::call(dispatcher, Domain::Session, "briefing_show", serde_json::json!({ "id": id }));
            render(&envelope, format, |data| println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()))
        }
    }
}

fn run_record<C: Clock>(dispatcher: &Dispatcher<C>, record: RecordArgs) -> Result<i32, ExitError> {
    match record.kind {
        RecordKind::Decision { id, decision, rationale, alternatives, format } => {
            let params = serde_json::json!({ "id": id, "decision": decision, "rationale": rationale, "alternatives": alternatives });
            let envelope = crate::call(dispatcher, Domain::Session, "record_decision", params);
            render(&envelope, format, |_| println!("decision recorded"))
        }
        RecordKind::Assumption { id, assumption, confidence, format } => {
            let params = serde_json::json!({ "id": id, "assumption": assumption, "confidence": confidence });
            let envelope = crate::call(dispatcher, Domain::Session, "record_assumption", params);
            render(&envelope, format, |_| println!("assumption recorded"))
        }
    }
}

fn render(
    envelope: &cleo_dispatch::Envelope,
    format: Option<OutputFormat>,
    render_text: impl FnOnce(&serde_json::Value),
) -> Result<i32, ExitError> {
    print_envelope(envelope, resolve_format(format), render_text).map_err(|e| ExitError::new(1, e.to_string()))
}
