// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering helpers shared across commands: format resolution (spec.md
//! §6.3: "resolves format (flag > env > config > TTY-aware default)"),
//! envelope-to-stdout printing, and the generic JSON-array-to-CSV writer
//! `list`/`archive-stats` share.

use clap::ValueEnum;
use cleo_dispatch::Envelope;
use serde_json::Value;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Resolve the effective format for a command: an explicit `--format` flag
/// wins, then `CLEO_FORMAT`, then a TTY-aware default (text for a terminal,
/// json otherwise) per spec.md §6.3.
pub fn resolve_format(explicit: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    if let Ok(value) = std::env::var("CLEO_FORMAT") {
        match value.as_str() {
            "json" => return OutputFormat::Json,
            "text" => return OutputFormat::Text,
            "csv" => return OutputFormat::Csv,
            _ => {}
        }
    }
    if std::io::stdout().is_terminal() {
        OutputFormat::Text
    } else {
        OutputFormat::Json
    }
}

/// Print a successful envelope's `data` as JSON, or hand it to `render_text`
/// for the text format. Returns the envelope's exit code either way so the
/// caller can still fail a successful-looking command (e.g. `--format csv`
/// on data that doesn't flatten to rows).
pub fn print_envelope(
    envelope: &Envelope,
    format: OutputFormat,
    render_text: impl FnOnce(&Value),
) -> anyhow::Result<i32> {
    if !envelope.success {
        let code = envelope.error.as_ref().map(|e| e.code.as_str()).unwrap_or("E_INTERNAL");
        let message = envelope.error.as_ref().map(|e| e.message.as_str()).unwrap_or("operation failed");
        eprintln!("error[{code}]: {message}");
        if let Some(suggestion) = envelope.error.as_ref().and_then(|e| e.suggestion.as_ref()) {
            eprintln!("  suggestion: {suggestion}");
        }
        return Ok(envelope.exit_code());
    }
    let data = envelope.data.clone().unwrap_or(Value::Null);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Text => render_text(&data),
        OutputFormat::Csv => print_csv(&data)?,
    }
    Ok(0)
}

/// Flatten a JSON array of objects into a CSV table. The header is taken
/// from the first row's keys; later rows are serialized in that same
/// column order, missing fields printed blank.
pub fn print_csv(data: &Value) -> anyhow::Result<()> {
    let rows = data.as_array().cloned().unwrap_or_else(|| vec![data.clone()]);
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    let Some(first) = rows.first().and_then(|r| r.as_object()) else {
        return Ok(());
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    writer.write_record(&columns)?;
    for row in &rows {
        let Some(obj) = row.as_object() else { continue };
        let record: Vec<String> = columns.iter().map(|c| scalar(obj.get(c))).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
