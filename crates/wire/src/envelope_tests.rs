// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths};
use cleo_dispatch::{admin, ProjectContext};

fn dispatcher(dir: &std::path::Path) -> Dispatcher<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    let ctx = ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default());
    Dispatcher::new(ctx)
}

fn request(domain: &str, operation: &str, params: Value) -> Request {
    Request { domain: domain.to_string(), operation: operation.to_string(), params, actor: default_actor() }
}

#[test]
fn mutate_runs_a_registered_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = mutate(&d, request("tasks", "add", serde_json::json!({ "title": "ship it" })));
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.meta.gateway, "mutate");
    assert_eq!(result.meta.domain, "tasks");
}

#[test]
fn query_rejects_a_mutation_name() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = query(&d, request("tasks", "add", serde_json::json!({ "title": "x" })));
    assert!(!result.success);
    assert_eq!(result.error.unwrap().code, "E_INVALID_OPERATION");
}

#[test]
fn unknown_domain_is_reported_without_reaching_the_dispatcher() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = query(&d, request("telemetry", "ping", serde_json::json!({})));
    assert!(!result.success);
    let error = result.error.unwrap();
    assert_eq!(error.code, "E_INVALID_OPERATION");
    assert!(error.message.contains("telemetry"));
}

#[test]
fn request_defaults_a_missing_actor_to_system() {
    let raw = serde_json::json!({ "domain": "tasks", "operation": "list", "params": {} });
    let request: Request = serde_json::from_value(raw).unwrap();
    assert_eq!(request.actor, "system");
}

#[test]
fn request_carries_an_explicit_actor_through_to_the_audit_log() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let start = mutate(
        &d,
        Request {
            domain: "session".to_string(),
            operation: "start".to_string(),
            params: serde_json::json!({ "scope": "global" }),
            actor: "agent-7".to_string(),
        },
    );
    assert!(start.success, "{:?}", start.error);
}
