// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `query`/`mutate` glue: parse a `{domain, operation, params}` call,
//! resolve `domain` against the registry's `Domain` enum, and hand the
//! rest straight to `cleo_dispatch::Dispatcher::dispatch`.

use cleo_core::Clock;
use cleo_dispatch::{Dispatcher, Envelope, EnvelopeMeta, ErrorPayload, Gateway};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One incoming call on either tool surface (spec §4.9).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    pub domain: String,
    pub operation: String,
    #[serde(default)]
    pub params: Value,
    /// Who is calling, for the audit log (spec §3.2: "session id or
    /// `system`"). Left to the caller to supply — the gateway itself has
    /// no notion of identity beyond what the transport hands it.
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_actor() -> String {
    "system".to_string()
}

/// Read-only tool: resolves `domain`, then dispatches on the query gateway.
pub fn query<C: Clock>(dispatcher: &Dispatcher<C>, request: Request) -> Envelope {
    dispatch(dispatcher, Gateway::Query, request)
}

/// Mutating tool: resolves `domain`, then dispatches on the mutate gateway.
pub fn mutate<C: Clock>(dispatcher: &Dispatcher<C>, request: Request) -> Envelope {
    dispatch(dispatcher, Gateway::Mutate, request)
}

fn dispatch<C: Clock>(dispatcher: &Dispatcher<C>, gateway: Gateway, request: Request) -> Envelope {
    let Request { domain, operation, params, actor } = request;
    match cleo_dispatch::Domain::from_str(&domain) {
        Ok(domain) => dispatcher.dispatch(gateway, domain, &operation, params, &actor),
        Err(_) => unknown_domain_envelope(dispatcher, gateway, &domain, &operation),
    }
}

fn unknown_domain_envelope<C: Clock>(dispatcher: &Dispatcher<C>, gateway: Gateway, domain: &str, operation: &str) -> Envelope {
    Envelope {
        meta: EnvelopeMeta {
            gateway: match gateway {
                Gateway::Query => "query",
                Gateway::Mutate => "mutate",
            },
            domain: "unknown",
            operation: operation.to_string(),
            version: cleo_dispatch::ENGINE_VERSION,
            timestamp: dispatcher.context().clock.now_rfc3339(),
            duration_ms: 0,
        },
        success: false,
        data: None,
        error: Some(ErrorPayload {
            code: "E_INVALID_OPERATION".to_string(),
            message: format!("unknown domain: {domain}"),
            details: None,
            suggestion: None,
            exit_code: 1,
        }),
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
