// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths};

fn dispatcher(dir: &std::path::Path) -> Dispatcher<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    let ctx = ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default());
    Dispatcher::new(ctx)
}

#[test]
fn add_then_list_round_trips_through_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let add = d.dispatch(Gateway::Mutate, Domain::Tasks, "add", serde_json::json!({ "title": "write docs" }), "agent-1");
    assert!(add.success, "{:?}", add.error);
    assert_eq!(add.meta.domain, "tasks");

    let list = d.dispatch(Gateway::Query, Domain::Tasks, "list", serde_json::json!({}), "agent-1");
    assert!(list.success);
    assert_eq!(list.data.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn wrong_gateway_is_rejected_before_routing() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = d.dispatch(Gateway::Query, Domain::Tasks, "add", serde_json::json!({ "title": "x" }), "agent-1");
    assert!(!result.success);
    assert_eq!(result.error.unwrap().code, "E_INVALID_OPERATION");
}

#[test]
fn unknown_operation_returns_an_error_envelope_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = d.dispatch(Gateway::Query, Domain::Tasks, "teleport", serde_json::json!({}), "agent-1");
    assert!(!result.success);
    assert_eq!(result.error.unwrap().code, "E_INVALID_OPERATION");
}

#[test]
fn missing_required_param_is_reported_before_the_handler_runs() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = d.dispatch(Gateway::Mutate, Domain::Tasks, "add", serde_json::json!({}), "agent-1");
    assert!(!result.success);
    assert_eq!(result.error.unwrap().code, "E_INPUT_MISSING");
}

#[test]
fn admin_init_then_doctor_reports_a_clean_root() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());

    let init = d.dispatch(Gateway::Mutate, Domain::Admin, "init", serde_json::json!({}), "agent-1");
    assert!(init.success);

    let doctor = d.dispatch(Gateway::Query, Domain::Admin, "doctor", serde_json::json!({}), "agent-1");
    assert!(doctor.success);
    assert_eq!(doctor.data.unwrap().as_array().unwrap().len(), 0);
}

#[test]
fn orchestrate_domain_has_no_reachable_operations() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let result = d.dispatch(Gateway::Query, Domain::Orchestrate, "anything", serde_json::json!({}), "agent-1");
    assert!(!result.success);
    assert_eq!(result.error.unwrap().code, "E_INVALID_OPERATION");
}

#[test]
fn session_start_and_record_decision_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let start = d.dispatch(Gateway::Mutate, Domain::Session, "start", serde_json::json!({ "scope": "global" }), "agent-1");
    assert!(start.success, "{:?}", start.error);
    let id = start.data.unwrap()["id"].as_str().unwrap().to_string();

    let decision = d.dispatch(
        Gateway::Mutate,
        Domain::Session,
        "record_decision",
        serde_json::json!({ "id": id, "decision": "use postgres" }),
        "agent-1",
    );
    assert!(decision.success, "{:?}", decision.error);
}

#[test]
fn rate_limiter_eventually_rejects_a_hot_loop() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path());
    admin::init(d.context()).unwrap();

    let rejected = (0..DEFAULT_RATE_LIMIT_OPS_PER_SEC * 2)
        .map(|_| d.dispatch(Gateway::Query, Domain::Tasks, "list", serde_json::json!({}), "agent-1"))
        .any(|env| !env.success && env.error.as_ref().unwrap().code == "E_RATE_LIMITED");
    assert!(rejected);
}
