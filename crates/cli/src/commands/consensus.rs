// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct ConsensusArgs {
    #[command(subcommand)]
    command: ConsensusCommand,
}

#[derive(clap::Subcommand)]
enum ConsensusCommand {
    /// Run the consensus-stage protocol validator against a voting matrix
    Validate {
        task_id: String,
        #[arg(long)]
        strict: bool,
        #[arg(long, value_name = "FILE")]
        voting_matrix: PathBuf,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Tally a contribution vote
    Vote {
        question_id: String,
        #[arg(long, value_name = "FILE")]
        contributions: PathBuf,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Detect conflicts and synthesize a decision from contributions
    Synthesize {
        #[arg(long, value_name = "FILE")]
        contributions: PathBuf,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Detect pairwise conflicts between contributions
    Conflicts {
        #[arg(long, value_name = "FILE")]
        contributions: PathBuf,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

fn read_json(path: &PathBuf) -> Result<serde_json::Value, ExitError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ExitError::new(3, format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| ExitError::new(1, format!("{}: {e}", path.display())))
}

pub fn run<C: Clock>(dispatcher: &Dispatcher<C>, args: ConsensusArgs) -> Result<i32, ExitError> {
    match args.command {
        ConsensusCommand::Validate { task_id, strict, voting_matrix, format } => {
            let options = read_json(&voting_matrix)?;
            let params = serde_json::json!({ "options": options, "strict": strict });
            let envelope = crate::call(dispatcher, Domain::Pipeline, "consensus", params);
            render(&envelope, format, |data| {
                let verdict = if data["valid"].as_bool().unwrap_or(false) { "passed" } else { "failed" };
                println!("{task_id}: consensus stage {verdict} (score {})", data["score"].as_u64().unwrap_or(0));
                print_protocol_violations(data);
            })
        }
        ConsensusCommand::Vote { question_id, contributions, format } => {
            let contributions = read_json(&contributions)?;
            let params = serde_json::json!({ "question_id": question_id, "contributions": contributions });
            let envelope = crate::call(dispatcher, Domain::Nexus, "consensus_vote", params);
            render(&envelope, format, |data| println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()))
        }
        ConsensusCommand::Synthesize { contributions, format } => {
            let contributions = read_json(&contributions)?;
            let envelope =
                crate::call(dispatcher, Domain::Nexus, "consensus_synthesize", serde_json::json!({ "contributions": contributions }));
            render(&envelope, format, |data| println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()))
        }
        ConsensusCommand::Conflicts { contributions, format } => {
            let contributions = read_json(&contributions)?;
            let envelope = crate::call(dispatcher, Domain::Nexus, "conflicts", serde_json::json!({ "contributions": contributions }));
            render(&envelope, format, |data| {
                let conflicts = data.as_array().cloned().unwrap_or_default();
                if conflicts.is_empty() {
                    println!("no conflicts detected");
                    return;
                }
                println!("{}", serde_json::to_string_pretty(&conflicts).unwrap_or_default());
            })
        }
    }
}

fn print_protocol_violations(data: &serde_json::Value) {
    let Some(violations) = data["violations"].as_array() else { return };
    for violation in violations {
        println!(
            "  [{}] {}: {}",
            violation["severity"].as_str().unwrap_or("?"),
            violation["code"].as_str().unwrap_or("?"),
            violation["message"].as_str().unwrap_or(""),
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
