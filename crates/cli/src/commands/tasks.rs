// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{resolve_format, print_envelope, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct AddArgs {
    title: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    priority: Option<String>,
    #[arg(long = "type")]
    task_type: Option<String>,
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    parent: Option<String>,
    #[arg(long, value_delimiter = ',')]
    depends: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,
    #[arg(long)]
    phase: Option<String>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn add<C: Clock>(dispatcher: &Dispatcher<C>, args: AddArgs) -> Result<i32, ExitError> {
    let params = serde_json::json!({
        "title": args.title,
        "description": args.description,
        "priority": args.priority,
        "task_type": args.task_type,
        "size": args.size,
        "parent_id": args.parent,
        "depends": args.depends,
        "labels": args.labels,
        "phase": args.phase,
    });
    let envelope = crate::call(dispatcher, Domain::Tasks, "add", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        if let Some(id) = data.get("duplicate").and_then(|v| v.as_str()) {
            println!("{} (duplicate of an existing task)", crate::color::muted(id));
        } else if let Some(task) = data.get("task") {
            println!("{}  {}", crate::color::literal(task["id"].as_str().unwrap_or("?")), task["title"].as_str().unwrap_or(""));
        }
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long = "type")]
    task_type: Option<String>,
    #[arg(long)]
    parent: Option<String>,
    #[arg(long)]
    children: Option<String>,
    #[arg(long)]
    tree: bool,
    #[arg(long = "verification-status")]
    verification_status: Option<String>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn list<C: Clock>(dispatcher: &Dispatcher<C>, args: ListArgs) -> Result<i32, ExitError> {
    let tree = args.tree;
    let params = serde_json::json!({
        "status": args.status,
        "type": args.task_type,
        "parent": args.parent,
        "children": args.children,
        "verification_status": args.verification_status,
    });
    let envelope = crate::call(dispatcher, Domain::Tasks, "list", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        let tasks = data.as_array().cloned().unwrap_or_default();
        if tasks.is_empty() {
            println!("no tasks");
            return;
        }
        if tree {
            print_tree(&tasks, None, 0);
            return;
        }
        for task in &tasks {
            println!(
                "{}  [{}] {}  {}",
                crate::color::literal(task["id"].as_str().unwrap_or("?")),
                task["status"].as_str().unwrap_or("?"),
                task["title"].as_str().unwrap_or(""),
                crate::color::muted(task["priority"].as_str().unwrap_or("")),
            );
        }
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

/// `--tree` is a rendering concern only: the dispatcher still returns a flat
/// list, this walks it by `parentId` and indents by depth.
fn print_tree(tasks: &[serde_json::Value], parent: Option<&str>, depth: usize) {
    for task in tasks {
        let task_parent = task["parentId"].as_str();
        if task_parent != parent {
            continue;
        }
        let id = task["id"].as_str().unwrap_or("?");
        println!(
            "{}{}  [{}] {}",
            "  ".repeat(depth),
            crate::color::literal(id),
            task["status"].as_str().unwrap_or("?"),
            task["title"].as_str().unwrap_or(""),
        );
        print_tree(tasks, Some(id), depth + 1);
    }
}

#[derive(clap::Args)]
pub struct ShowArgs {
    id: String,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn show<C: Clock>(dispatcher: &Dispatcher<C>, args: ShowArgs) -> Result<i32, ExitError> {
    let envelope = crate::call(dispatcher, Domain::Tasks, "show", serde_json::json!({ "id": args.id }));
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        println!("{}", crate::color::header(data["title"].as_str().unwrap_or("")));
        println!("status: {}", data["status"].as_str().unwrap_or("?"));
        println!("priority: {}", data["priority"].as_str().unwrap_or("?"));
        if let Some(desc) = data["description"].as_str() {
            println!("\n{desc}");
        }
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct CompleteArgs {
    id: String,
    #[arg(long)]
    no_auto_complete: bool,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn complete<C: Clock>(dispatcher: &Dispatcher<C>, args: CompleteArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let params = serde_json::json!({ "id": args.id, "no_auto_complete": args.no_auto_complete });
    let envelope = crate::call(dispatcher, Domain::Tasks, "complete", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        println!("{} completed", data["task"]["id"].as_str().unwrap_or(&id));
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    id: String,
    #[arg(long)]
    reason: String,
    #[arg(long, default_value = "block")]
    children: String,
    #[arg(long)]
    force: bool,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn delete<C: Clock>(dispatcher: &Dispatcher<C>, args: DeleteArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let params = serde_json::json!({
        "id": args.id,
        "reason": args.reason,
        "children": args.children,
        "force": args.force,
    });
    let envelope = crate::call(dispatcher, Domain::Tasks, "cancel", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        let archived = data["archived"].as_array().map(|a| a.len()).unwrap_or(0);
        println!("{id} cancelled, {archived} descendant(s) archived");
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct ArchiveArgs {
    id: String,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn archive<C: Clock>(dispatcher: &Dispatcher<C>, args: ArchiveArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let envelope = crate::call(dispatcher, Domain::Tasks, "archive", serde_json::json!({ "id": args.id }));
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        println!("{} archived", data["id"].as_str().unwrap_or(&id));
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

pub fn archive_auto<C: Clock>(dispatcher: &Dispatcher<C>) -> Result<i32, ExitError> {
    let envelope = crate::call(dispatcher, Domain::Tasks, "archive_auto", serde_json::json!({}));
    let code = print_envelope(&envelope, resolve_format(None), |data| {
        let archived = data.as_array().map(|a| a.len()).unwrap_or(0);
        println!("{archived} task(s) archived");
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct RestoreArgs {
    #[arg(required = true, value_delimiter = ',')]
    ids: Vec<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    preserve_status: bool,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn restore<C: Clock>(dispatcher: &Dispatcher<C>, args: RestoreArgs) -> Result<i32, ExitError> {
    let params = serde_json::json!({
        "ids": args.ids,
        "status": args.status,
        "preserve_status": args.preserve_status,
    });
    let envelope = crate::call(dispatcher, Domain::Tasks, "restore", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        let restored = data["restored"].as_array().map(|a| a.len()).unwrap_or(0);
        println!("{restored} task(s) restored");
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct ArchiveStatsArgs {
    #[arg(long)]
    summary: bool,
    #[arg(long)]
    by_phase: bool,
    #[arg(long)]
    by_label: bool,
    #[arg(long)]
    by_priority: bool,
    #[arg(long)]
    cycle_times: bool,
    #[arg(long)]
    trends: bool,
    #[arg(long)]
    since: Option<String>,
    #[arg(long)]
    until: Option<String>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn archive_stats<C: Clock>(dispatcher: &Dispatcher<C>, args: ArchiveStatsArgs) -> Result<i32, ExitError> {
    let params = serde_json::json!({ "since": args.since, "until": args.until });
    let envelope = crate::call(dispatcher, Domain::Tasks, "archive_stats", params);
    // breakdown flags select which sections of the aggregate print in text
    // mode; --summary (or no flag at all) prints the whole-archive total.
    let show_all = !(args.by_phase || args.by_label || args.by_priority || args.cycle_times || args.trends) || args.summary;
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        if show_all || args.cycle_times {
            let ct = &data["cycleTime"];
            println!(
                "total archived: {}  mean cycle time: {:.1}d  (min {:.1}d, max {:.1}d)",
                data["totalArchived"].as_u64().unwrap_or(0),
                ct["meanDays"].as_f64().unwrap_or(0.0),
                ct["minDays"].as_f64().unwrap_or(0.0),
                ct["maxDays"].as_f64().unwrap_or(0.0),
            );
        }
        if show_all || args.by_phase {
            print_buckets("by phase", &data["byPhase"]);
        }
        if show_all || args.by_label {
            print_buckets("by label", &data["byLabel"]);
        }
        if show_all || args.by_priority {
            print_buckets("by priority", &data["byPriority"]);
        }
        if show_all || args.trends {
            if let Some(points) = data["trends"].as_array() {
                println!("{}", crate::color::header("trends"));
                for point in points {
                    println!("  {}: {} archived", point["month"].as_str().unwrap_or("?"), point["archived"].as_u64().unwrap_or(0));
                }
            }
        }
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

fn print_buckets(label: &str, buckets: &serde_json::Value) {
    let Some(buckets) = buckets.as_array() else { return };
    println!("{}", crate::color::header(label));
    for bucket in buckets {
        println!(
            "  {}: {} archived, mean {:.1}d",
            bucket["key"].as_str().unwrap_or("?"),
            bucket["cycleTime"]["count"].as_u64().unwrap_or(0),
            bucket["cycleTime"]["meanDays"].as_f64().unwrap_or(0.0),
        );
    }
}

#[derive(clap::Args)]
pub struct ReparentArgs {
    id: String,
    #[arg(long)]
    parent: Option<String>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn reparent<C: Clock>(dispatcher: &Dispatcher<C>, args: ReparentArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let params = serde_json::json!({ "id": args.id, "parent_id": args.parent });
    let envelope = crate::call(dispatcher, Domain::Tasks, "reparent", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        println!("{} reparented", data["id"].as_str().unwrap_or(&id));
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct ReorderArgs {
    id: String,
    position: u32,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn reorder<C: Clock>(dispatcher: &Dispatcher<C>, args: ReorderArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let params = serde_json::json!({ "id": args.id, "position": args.position });
    let envelope = crate::call(dispatcher, Domain::Tasks, "reorder", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        println!("{} moved to position {}", data["id"].as_str().unwrap_or(&id), data["position"]);
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct FocusArgs {
    #[command(subcommand)]
    action: FocusAction,
}

#[derive(clap::Subcommand)]
enum FocusAction {
    /// Claim focus on a task
    Set {
        id: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Release focus
    Clear {
        #[arg(long)]
        session: Option<String>,
    },
}

pub fn focus<C: Clock>(dispatcher: &Dispatcher<C>, args: FocusArgs) -> Result<i32, ExitError> {
    let (operation, params) = match args.action {
        FocusAction::Set { id, session } => ("focus_set", serde_json::json!({ "id": id, "session_id": session })),
        FocusAction::Clear { session } => ("focus_clear", serde_json::json!({ "session_id": session })),
    };
    let envelope = crate::call(dispatcher, Domain::Tasks, operation, params);
    let code = print_envelope(&envelope, resolve_format(None), |_| println!("ok")).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    id: String,
    /// Set every configured gate to the same value
    #[arg(long, conflicts_with = "gate")]
    all: Option<bool>,
    /// Set one gate, e.g. `--gate testsPassed=true`; may be repeated
    #[arg(long = "gate", value_parser = parse_gate)]
    gate: Vec<(String, bool)>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

fn parse_gate(s: &str) -> Result<(String, bool), String> {
    let (name, value) = s.split_once('=').ok_or_else(|| format!("expected name=value, got {s}"))?;
    let value: bool = value.parse().map_err(|_| format!("expected true/false, got {value}"))?;
    Ok((name.to_string(), value))
}

pub fn verify<C: Clock>(dispatcher: &Dispatcher<C>, args: VerifyArgs) -> Result<i32, ExitError> {
    let id = args.id.clone();
    let format = args.format;
    let params = match args.all {
        Some(value) => serde_json::json!({ "id": args.id, "all": value }),
        None => {
            let gates: std::collections::BTreeMap<String, bool> = args.gate.into_iter().collect();
            serde_json::json!({ "id": args.id, "gates": gates })
        }
    };
    let envelope = crate::call(dispatcher, Domain::Tasks, "verify", params);
    let code = print_envelope(&envelope, resolve_format(format), |data| {
        println!("{} gates updated, passed={}", data["id"].as_str().unwrap_or(&id), data["verification"]["passed"]);
    }).map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}
