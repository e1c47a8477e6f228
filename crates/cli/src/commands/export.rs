// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cleo export`: renders the live task set for an external tool. Unlike
//! every other command here this has no dispatch operation of its own —
//! it calls `tasks.list` and reshapes the same data three ways, so all of
//! the logic lives in this adapter rather than behind the dispatcher.

use crate::exit_error::ExitError;
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};
use serde_json::Value;

#[derive(clap::Args)]
pub struct ExportArgs {
    #[arg(long, value_enum, default_value = "json")]
    format: ExportFormat,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    max: Option<usize>,
    #[arg(long)]
    output: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ExportFormat {
    Todowrite,
    Json,
    Markdown,
}

pub fn export<C: Clock>(dispatcher: &Dispatcher<C>, args: ExportArgs) -> Result<i32, ExitError> {
    let envelope =
        crate::call(dispatcher, Domain::Tasks, "list", serde_json::json!({ "status": args.status }));
    if !envelope.success {
        let code = envelope.error.as_ref().map(|e| e.code.as_str()).unwrap_or("E_INTERNAL");
        let message = envelope.error.as_ref().map(|e| e.message.as_str()).unwrap_or("operation failed");
        eprintln!("error[{code}]: {message}");
        return Ok(envelope.exit_code());
    }
    let mut tasks = envelope.data.unwrap_or(Value::Null).as_array().cloned().unwrap_or_default();
    if let Some(max) = args.max {
        tasks.truncate(max);
    }

    let rendered = match args.format {
        ExportFormat::Json => serde_json::to_string_pretty(&tasks).map_err(|e| ExitError::new(1, e.to_string()))?,
        ExportFormat::Todowrite => render_todowrite(&tasks),
        ExportFormat::Markdown => render_markdown(&tasks),
    };

    match args.output {
        Some(path) => std::fs::write(&path, rendered).map_err(|e| ExitError::new(3, format!("{}: {e}", path.display())))?,
        None => println!("{rendered}"),
    }
    Ok(0)
}

/// `todowrite` mirrors the `content`/`status`/`activeForm` triple an agent
/// harness's todo-list tool expects, one object per task.
fn render_todowrite(tasks: &[Value]) -> String {
    let items: Vec<Value> = tasks
        .iter()
        .map(|t| {
            let title = t["title"].as_str().unwrap_or("");
            serde_json::json!({
                "content": title,
                "status": todowrite_status(t["status"].as_str().unwrap_or("")),
                "activeForm": title,
            })
        })
        .collect();
    serde_json::to_string_pretty(&items).unwrap_or_default()
}

fn todowrite_status(status: &str) -> &'static str {
    match status {
        "done" | "cancelled" => "completed",
        "active" | "blocked" => "in_progress",
        _ => "pending",
    }
}

fn render_markdown(tasks: &[Value]) -> String {
    let mut out = String::from("# Tasks\n\n");
    for task in tasks {
        let checked = matches!(task["status"].as_str(), Some("done") | Some("cancelled"));
        out.push_str(&format!(
            "- [{}] {} ({})\n",
            if checked { "x" } else { " " },
            task["title"].as_str().unwrap_or(""),
            task["id"].as_str().unwrap_or("?"),
        ));
    }
    out
}
