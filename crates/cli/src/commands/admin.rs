// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct DoctorArgs {
    #[arg(long)]
    max_depth: Option<u32>,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn doctor<C: Clock>(dispatcher: &Dispatcher<C>, args: DoctorArgs) -> Result<i32, ExitError> {
    let params = serde_json::json!({ "max_depth": args.max_depth });
    let envelope = crate::call(dispatcher, Domain::Admin, "doctor", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        let findings = data.as_array().cloned().unwrap_or_default();
        if findings.is_empty() {
            println!("{}", crate::color::literal("project root is healthy"));
            return;
        }
        for finding in &findings {
            println!(
                "{} [{}]: {}",
                crate::color::header("finding"),
                finding["code"].as_str().unwrap_or("?"),
                finding["message"].as_str().unwrap_or(""),
            );
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

pub fn init<C: Clock>(dispatcher: &Dispatcher<C>) -> Result<i32, ExitError> {
    let envelope = crate::call(dispatcher, Domain::Admin, "init", serde_json::json!({}));
    let code = print_envelope(&envelope, resolve_format(None), |data| {
        if data["createdRoot"].as_bool().unwrap_or(false) {
            println!("{}", crate::color::literal("initialised a new project root"));
        } else {
            println!("project root already initialised, nothing to do");
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}
