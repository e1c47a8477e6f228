// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed middleware pipeline (spec §4.7): sanitise → rate-limit →
//! protocol-filter → audit → route. Grounded on the ordered-effect
//! discipline of the teacher's `MaterializedState::apply_event` (every
//! event passes through the same stages in the same order, no adapter
//! gets to skip one) and on the stage list spec.md §4.7 spells out
//! directly.

use crate::registry::{find, missing_params, Domain, Gateway, OperationSpec};
use cleo_core::CleoError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// `_meta` block attached to every dispatch result (spec §4.7).
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeMeta {
    pub gateway: &'static str,
    pub domain: &'static str,
    pub operation: String,
    pub version: &'static str,
    pub timestamp: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// The canonical CLI exit code this error maps to (spec §6.3/§7).
    /// Not part of the wire shape's documented fields, but carried here so
    /// the CLI adapter doesn't need to re-derive it from `code`.
    #[serde(skip)]
    pub exit_code: i32,
}

/// The uniform result shape every dispatch call returns (spec §4.7).
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(rename = "_meta")]
    pub meta: EnvelopeMeta,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

impl Envelope {
    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map(|e| e.exit_code).unwrap_or(0)
    }
}

/// Strip ASCII control characters (except `\n`/`\t`) from every string leaf
/// of a params object (spec §4.7 stage 1: "strip control chars, enforce
/// field length caps, coerce known enums").
pub fn sanitise(params: &Value) -> Value {
    match params {
        Value::String(s) => {
            Value::String(s.chars().filter(|c| !c.is_control() || *c == '\n' || *c == '\t').collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitise).collect()),
        Value::Object(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), sanitise(v))).collect())
        }
        other => other.clone(),
    }
}

/// Per-gateway token bucket rate limiter (spec §4.7 stage 2, default 100
/// ops/s). Disabled by passing a limit of 0.
pub struct RateLimiter {
    capacity: u32,
    refill_per_sec: u32,
    buckets: Mutex<HashMap<&'static str, (f64, Instant)>>,
}

impl RateLimiter {
    pub fn new(ops_per_sec: u32) -> Self {
        Self { capacity: ops_per_sec, refill_per_sec: ops_per_sec, buckets: Mutex::new(HashMap::new()) }
    }

    /// `true` if the call is allowed (and consumes one token).
    pub fn allow(&self, gateway_key: &'static str) -> bool {
        if self.capacity == 0 {
            return true;
        }
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let (tokens, last) = buckets.entry(gateway_key).or_insert((self.capacity as f64, now));
        let elapsed = now.duration_since(*last).as_secs_f64();
        *tokens = (*tokens + elapsed * self.refill_per_sec as f64).min(self.capacity as f64);
        *last = now;
        if *tokens >= 1.0 {
            *tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Look up and validate a call against the registry (stage 0, ahead of the
/// fixed pipeline — every stage below assumes the operation is known and
/// its required params are present).
pub fn resolve(gateway: Gateway, domain: Domain, operation: &str, params: &Value) -> Result<&'static OperationSpec, CleoError> {
    let spec = find(domain, operation)
        .ok_or_else(|| CleoError::InvalidOperation { domain: domain.as_str().to_string(), operation: operation.to_string() })?;
    if spec.gateway != gateway {
        return Err(CleoError::InvalidOperation { domain: domain.as_str().to_string(), operation: operation.to_string() });
    }
    let missing = missing_params(spec, params);
    if let Some(first) = missing.first() {
        return Err(CleoError::InputMissing((*first).to_string()));
    }
    Ok(spec)
}

/// Build the success envelope for a completed operation (stage 5: route +
/// wrap). `now_rfc3339`/`started` let the caller thread a testable clock
/// through instead of this module reaching for wall-clock time itself.
pub fn ok_envelope(
    spec: &OperationSpec,
    now_rfc3339: String,
    started: Instant,
    data: impl Serialize,
) -> Result<Envelope, CleoError> {
    Ok(Envelope {
        meta: EnvelopeMeta {
            gateway: gateway_str(spec.gateway),
            domain: spec.domain.as_str(),
            operation: spec.operation.to_string(),
            version: ENGINE_VERSION,
            timestamp: now_rfc3339,
            duration_ms: duration_ms(started),
        },
        success: true,
        data: Some(serde_json::to_value(data)?),
        error: None,
    })
}

/// Build the error envelope for a failed operation.
pub fn err_envelope(gateway: Gateway, domain: Domain, operation: &str, now_rfc3339: String, started: Instant, err: &CleoError) -> Envelope {
    Envelope {
        meta: EnvelopeMeta {
            gateway: gateway_str(gateway),
            domain: domain.as_str(),
            operation: operation.to_string(),
            version: ENGINE_VERSION,
            timestamp: now_rfc3339,
            duration_ms: duration_ms(started),
        },
        success: false,
        data: None,
        error: Some(ErrorPayload {
            code: err.code(),
            message: err.to_string(),
            details: None,
            suggestion: err.suggestion(),
            exit_code: err.exit_code(),
        }),
    }
}

fn gateway_str(g: Gateway) -> &'static str {
    match g {
        Gateway::Query => "query",
        Gateway::Mutate => "mutate",
    }
}

fn duration_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// An audit-log line for one dispatch call (spec §4.7 stage 4): before/after
/// diff, success, duration, error code.
pub struct AuditRecord {
    pub action: String,
    pub actor: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub success: bool,
    pub duration_ms: u64,
    pub error_code: Option<String>,
}

impl AuditRecord {
    pub fn into_log_entry(self, now_rfc3339: String, task_id: Option<cleo_core::TaskId>) -> cleo_core::LogEntry {
        let mut entry = cleo_core::LogEntry::new(now_rfc3339, self.action, self.actor)
            .with_diff(self.before, self.after)
            .with_details(serde_json::json!({
                "success": self.success,
                "duration_ms": self.duration_ms,
                "error": self.error_code,
            }));
        if let Some(id) = task_id {
            entry = entry.with_task(id);
        }
        entry
    }
}

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;
