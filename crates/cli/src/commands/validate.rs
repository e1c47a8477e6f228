// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct ValidateArgs {
    #[arg(long)]
    max_depth: Option<u32>,
    /// Auto-repair dangling parents: `unlink` or `cancel`
    #[arg(long, value_name = "POLICY")]
    fix_orphans: Option<String>,
    #[arg(long)]
    fix_positions: bool,
    #[arg(long)]
    fix_checksum: bool,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn validate<C: Clock>(dispatcher: &Dispatcher<C>, args: ValidateArgs) -> Result<i32, ExitError> {
    if let Some(policy) = &args.fix_orphans {
        let envelope = crate::call(dispatcher, Domain::Check, "fix_orphans", serde_json::json!({ "policy": policy }));
        return render(&envelope, args.format, |data| {
            let fixed = data.as_array().map(|a| a.len()).unwrap_or(0);
            println!("{fixed} orphan(s) repaired");
        });
    }
    if args.fix_positions {
        let envelope = crate::call(dispatcher, Domain::Check, "fix_positions", serde_json::json!({}));
        return render(&envelope, args.format, |data| {
            println!("{} position gap(s) repaired", data.as_u64().unwrap_or(0));
        });
    }
    if args.fix_checksum {
        let envelope = crate::call(dispatcher, Domain::Check, "fix_checksum", serde_json::json!({}));
        return render(&envelope, args.format, |data| match data["outcome"].as_str() {
            Some("recomputed") => println!("checksum recomputed"),
            _ => println!("checksum already matches"),
        });
    }

    let params = serde_json::json!({ "max_depth": args.max_depth });
    let envelope = crate::call(dispatcher, Domain::Check, "validate", params);
    render(&envelope, args.format, |data| {
        let findings = data.as_array().cloned().unwrap_or_default();
        if findings.is_empty() {
            println!("{}", crate::color::literal("no issues found"));
            return;
        }
        for finding in &findings {
            println!(
                "{} [{}]: {}",
                crate::color::header(finding["field"].as_str().unwrap_or("?")),
                finding["code"].as_str().unwrap_or("?"),
                finding["message"].as_str().unwrap_or(""),
            );
        }
    })
}

fn render(
    envelope: &cleo_dispatch::Envelope,
    format: Option<OutputFormat>,
    render_text: impl FnOnce(&serde_json::Value),
) -> Result<i32, ExitError> {
    print_envelope(envelope, resolve_format(format), render_text).map_err(|e| ExitError::new(1, e.to_string()))
}
