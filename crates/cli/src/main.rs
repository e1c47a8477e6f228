// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cleo`: the CLI adapter (spec §4.8). Parses `cleo <command> [flags]`,
//! translates it into `{domain, operation, params}`, and hands the rest to
//! `cleo_dispatch::Dispatcher::dispatch` — no business logic lives here,
//! only argument parsing and rendering of the returned envelope.

mod color;
mod commands;
mod exit_error;
mod output;

use clap::Parser;
use cleo_core::{PolicyConfig, ProjectPaths, SystemClock};
use cleo_dispatch::{registry, Dispatcher, Domain, Envelope, Gateway, ProjectContext};
use exit_error::ExitError;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cleo", version, about = "Agent task and session management engine", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CLEO_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_env("RUST_LOG"))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run(cli: Cli) -> Result<i32, ExitError> {
    let root = find_project_root(&std::env::current_dir().map_err(|e| ExitError::new(3, e.to_string()))?);
    let paths = ProjectPaths::resolve(root, |key| std::env::var(key).ok());
    let config = PolicyConfig::load_or_default(&paths.config_file).map_err(|e| ExitError::new(3, e.to_string()))?;
    let ctx = ProjectContext::new(paths, config, SystemClock);
    let dispatcher = Dispatcher::new(ctx);

    commands::run(&dispatcher, cli.command)
}

/// Walk up from `start` looking for a `.cleo` directory, the project root
/// marker (spec §6.1). Falls back to `start` itself so a fresh checkout
/// still resolves somewhere sane for `cleo init`.
fn find_project_root(start: &Path) -> PathBuf {
    let mut dir = start;
    loop {
        if dir.join(".cleo").is_dir() {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start.to_path_buf(),
        }
    }
}

/// Resolve the registered gateway for `domain.operation` and dispatch,
/// falling back to `Mutate` for an unregistered call so the dispatcher's
/// own `resolve()` produces the right `E_INVALID_OPERATION` envelope rather
/// than this adapter silently rejecting it first.
pub(crate) fn call<C: cleo_core::Clock>(
    dispatcher: &Dispatcher<C>,
    domain: Domain,
    operation: &str,
    params: Value,
) -> Envelope {
    let gateway = registry::find(domain, operation).map(|spec| spec.gateway).unwrap_or(Gateway::Mutate);
    dispatcher.dispatch(gateway, domain, operation, params, "system")
}
