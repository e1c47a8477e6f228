// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::ExitError;
use crate::output::{print_envelope, resolve_format, OutputFormat};
use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Domain};

#[derive(clap::Args)]
pub struct RelatedArgs {
    id: String,
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    #[arg(long)]
    format: Option<OutputFormat>,
}

pub fn related<C: Clock>(dispatcher: &Dispatcher<C>, args: RelatedArgs) -> Result<i32, ExitError> {
    let params = serde_json::json!({ "id": args.id, "top_k": args.top_k });
    let envelope = crate::call(dispatcher, Domain::Tools, "related", params);
    let code = print_envelope(&envelope, resolve_format(args.format), |data| {
        let ranked = data.as_array().cloned().unwrap_or_default();
        if ranked.is_empty() {
            println!("no related tasks found");
            return;
        }
        for entry in &ranked {
            println!(
                "{}  {}",
                crate::color::literal(entry["id"].as_str().unwrap_or("?")),
                crate::color::muted(&format!("score {:.2}", entry["score"].as_f64().unwrap_or(0.0))),
            );
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}

pub fn waves<C: Clock>(dispatcher: &Dispatcher<C>) -> Result<i32, ExitError> {
    let envelope = crate::call(dispatcher, Domain::Tools, "waves", serde_json::json!({}));
    let code = print_envelope(&envelope, resolve_format(None), |data| {
        let Some(by_id) = data.as_object() else { return };
        if by_id.is_empty() {
            println!("no schedulable tasks");
            return;
        }
        let mut by_wave: std::collections::BTreeMap<u64, Vec<&str>> = std::collections::BTreeMap::new();
        for (id, wave) in by_id {
            by_wave.entry(wave.as_u64().unwrap_or(0)).or_default().push(id.as_str());
        }
        for (wave, mut ids) in by_wave {
            ids.sort_unstable();
            println!("{}: {}", crate::color::header(&format!("wave {wave}")), ids.join(", "));
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(code)
}
