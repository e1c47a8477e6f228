// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct ResearchArgs {
    #[command(subcommand)]
    command: ResearchCommand,
}

#[derive(clap::Subcommand)]
enum ResearchCommand {
    /// Append a research entry
    Add {
        file: String,
        title: String,
        #[arg(long = "finding", value_delimiter = ',')]
        key_findings: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        topics: Vec<String>,
        #[arg(long = "needs-followup", value_delimiter = ',')]
        needs_followup: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        linked_tasks: Vec<String>,
        /// One of draft, final, superseded
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Most recent research entries
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Research entries with open followups
    Followups {
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Research entries matching a topic
    Show {
        topic: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Research entries linked to a task
    ByTask {
        task_id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Link a research entry to a task
    Link {
        task_id: String,
        entry_id: String,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

pub fn run<C: Clock>(dispatcher: &Dispatcher<C>, args: ResearchArgs) -> Result<i32, ExitError> {
    match args.command {
        ResearchCommand::Add { file, title, key_findings, topics, needs_followup, linked_tasks, status, format } => {
            let params = serde_json::json!({
                "file": file,
                "title": title,
                "key_findings": key_findings,
                "topics": topics,
                "needs_followup": needs_followup,
                "linked_tasks": linked_tasks,
                "status": status,
            });
            let envelope = crate::call(dispatcher, Domain::Memory, "research_record", params);
            render(&envelope, format, |data| {
                println!("{} recorded", crate::color::literal(data["id"].as_str().unwrap_or("?")));
            })
        }
        ResearchCommand::List { limit, format } => {
            let envelope = crate::call(dispatcher, Domain::Memory, "research_latest", serde_json::json!({ "limit": limit }));
            render(&envelope, format, print_entries)
        }
        ResearchCommand::Followups { format } => {
            let envelope = crate::call(dispatcher, Domain::Memory, "research_pending_followups", serde_json::json!({}));
            render(&envelope, format, print_entries)
        }
        ResearchCommand::Show { topic, format } => {
            let envelope = crate::call(dispatcher, Domain::Memory, "research_by_topic", serde_json::json!({ "topic": topic }));
            render(&envelope, format, print_entries)
        }
        ResearchCommand::ByTask { task_id, format } => {
            let envelope = crate::call(dispatcher, Domain::Memory, "research_by_task", serde_json::json!({ "task_id": task_id }));
            render(&envelope, format, print_entries)
        }
        ResearchCommand::Link { task_id, entry_id, format } => {
            let params = serde_json::json!({ "task_id": task_id, "entry_id": entry_id });
            let envelope = crate::call(dispatcher, Domain::Memory, "research_link", params);
            render(&envelope, format, |_| println!("linked"))
        }
    }
}

fn print_entries(data: &serde_json::Value) {
    let entries = data.as_array().cloned().unwrap_or_default();
    if entries.is_empty() {
        println!("no research entries");
        return;
    }
    for entry in &entries {
        println!(
            "{}  {}  {}",
            crate::color::literal(entry["id"].as_str().unwrap_or("?")),
            entry["title"].as_str().unwrap_or(""),
            crate::color::muted(entry["status"].as_str().unwrap_or("")),
        );
    }
}

fn render(
    envelope: &cleo_dispatch::Envelope,
    format: Option<OutputFormat>,
    render_text: impl FnOnce(&serde_json::Value),
) -> Result<i32, ExitError> {
    print_envelope(envelope, resolve_format(format), render_text).map_err(|e| ExitError::new(1, e.to_string()))
}
