// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn scope_parses_global() {
    assert_eq!(Scope::parse("global").unwrap(), Scope::Global);
}

#[test]
fn scope_parses_epic_and_epic_phase() {
    let epic = Scope::parse("epic:T001").unwrap();
    assert_eq!(epic, Scope::Epic(TaskId::from_number(1)));

    let phase = Scope::parse("epic-phase:T001:design").unwrap();
    assert_eq!(phase, Scope::EpicPhase(TaskId::from_number(1), "design".to_string()));
}

#[test]
fn scope_rejects_malformed_input() {
    assert!(Scope::parse("bogus").is_err());
    assert!(Scope::parse("epic:notanid").is_err());
    assert!(Scope::parse("epic-phase:T001").is_err());
}

#[test]
fn scope_roundtrips_through_display_and_parse() {
    let s = Scope::EpicPhase(TaskId::from_number(12), "qa".to_string());
    let rendered = s.to_string();
    assert_eq!(rendered, "epic-phase:T012:qa");
    assert_eq!(Scope::parse(&rendered).unwrap(), s);
}

#[test]
fn scope_overlaps_is_reflexive_and_handles_global() {
    let a = Scope::Epic(TaskId::from_number(1));
    let b = Scope::Epic(TaskId::from_number(2));
    assert!(a.overlaps(&Scope::Global));
    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&Scope::EpicPhase(TaskId::from_number(1), "design".to_string())));
}

#[test]
fn session_status_transitions_match_state_machine() {
    use SessionStatus::*;
    assert!(Active.can_transition_to(Suspended));
    assert!(Active.can_transition_to(Ended));
    assert!(Suspended.can_transition_to(Active));
    assert!(Ended.can_transition_to(Active));
    assert!(Ended.can_transition_to(Closed));
    assert!(!Closed.can_transition_to(Active));
    assert!(!Suspended.can_transition_to(Closed));
}

#[test]
fn only_active_sessions_can_mutate() {
    assert!(SessionStatus::Active.can_mutate());
    assert!(!SessionStatus::Suspended.can_mutate());
    assert!(!SessionStatus::Ended.can_mutate());
    assert!(!SessionStatus::Closed.can_mutate());
}

#[test]
fn session_roundtrips_through_json() {
    let session = Session {
        id: SessionId::generate(1_700_000_000_000),
        scope: Scope::Epic(TaskId::from_number(3)),
        name: Some("refactor auth".to_string()),
        agent_id: None,
        focus: Some(TaskId::from_number(5)),
        status: SessionStatus::Active,
        started_at: "2026-01-01T00:00:00Z".to_string(),
        last_event_at: "2026-01-01T00:05:00Z".to_string(),
        ended_at: None,
        note: None,
        decisions: vec![DecisionRecord {
            decision: "use JWT".to_string(),
            rationale: Some("existing infra".to_string()),
            alternatives: vec!["sessions".to_string()],
            recorded_at: "2026-01-01T00:01:00Z".to_string(),
            resolved: false,
        }],
        assumptions: vec![AssumptionRecord {
            assumption: "traffic is low".to_string(),
            confidence: Confidence::Medium,
            recorded_at: "2026-01-01T00:02:00Z".to_string(),
        }],
        handoff: None,
    };
    let json = serde_json::to_string(&session).unwrap();
    assert!(json.contains("\"scope\":\"epic:T003\""));
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(session, back);
}

#[test]
fn session_is_active_reflects_status() {
    let mut session = Session {
        id: SessionId::generate(0),
        scope: Scope::Global,
        name: None,
        agent_id: None,
        focus: None,
        status: SessionStatus::Active,
        started_at: "2026-01-01T00:00:00Z".to_string(),
        last_event_at: "2026-01-01T00:00:00Z".to_string(),
        ended_at: None,
        note: None,
        decisions: Vec::new(),
        assumptions: Vec::new(),
        handoff: None,
    };
    assert!(session.is_active());
    session.status = SessionStatus::Suspended;
    assert!(!session.is_active());
}
