// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn sanitise_strips_control_chars_but_keeps_newline_and_tab() {
    let input = json!({"title": "hello\u{0007}world\n\tok"});
    let out = sanitise(&input);
    assert_eq!(out["title"], json!("helloworld\n\tok"));
}

#[test]
fn sanitise_recurses_into_arrays_and_objects() {
    let input = json!({"labels": ["a\u{0001}", "b"]});
    let out = sanitise(&input);
    assert_eq!(out["labels"], json!(["a", "b"]));
}

#[test]
fn resolve_rejects_unknown_operation() {
    let err = resolve(Gateway::Mutate, Domain::Tasks, "nonexistent", &json!({})).unwrap_err();
    assert_eq!(err.code(), "E_INVALID_OPERATION");
}

#[test]
fn resolve_rejects_wrong_gateway() {
    let err = resolve(Gateway::Mutate, Domain::Tasks, "list", &json!({})).unwrap_err();
    assert_eq!(err.code(), "E_INVALID_OPERATION");
}

#[test]
fn resolve_rejects_missing_required_param() {
    let err = resolve(Gateway::Mutate, Domain::Tasks, "add", &json!({})).unwrap_err();
    assert_eq!(err.code(), "E_INPUT_MISSING");
}

#[test]
fn resolve_accepts_well_formed_call() {
    let params = json!({"title": "Write docs"});
    let spec = resolve(Gateway::Mutate, Domain::Tasks, "add", &params).unwrap();
    assert_eq!(spec.operation, "add");
}

#[test]
fn rate_limiter_allows_up_to_capacity_then_blocks() {
    let limiter = RateLimiter::new(2);
    assert!(limiter.allow("cli"));
    assert!(limiter.allow("cli"));
    assert!(!limiter.allow("cli"));
}

#[test]
fn rate_limiter_disabled_when_capacity_zero() {
    let limiter = RateLimiter::new(0);
    for _ in 0..1000 {
        assert!(limiter.allow("cli"));
    }
}

#[test]
fn ok_envelope_carries_meta_and_data() {
    let spec = find(Domain::Tasks, "list").unwrap();
    let env = ok_envelope(spec, "2026-01-01T00:00:00Z".to_string(), std::time::Instant::now(), json!({"tasks": []})).unwrap();
    assert!(env.success);
    assert_eq!(env.meta.domain, "tasks");
    assert_eq!(env.exit_code(), 0);
}

#[test]
fn err_envelope_carries_error_code_and_message() {
    let err = CleoError::TaskNotFound("T999".to_string());
    let env = err_envelope(Gateway::Query, Domain::Tasks, "show", "2026-01-01T00:00:00Z".to_string(), std::time::Instant::now(), &err);
    assert!(!env.success);
    assert_eq!(env.error.unwrap().code, "E_TASK_NOT_FOUND");
}
