// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{ManifestEntryId, ManifestStatus};

fn manifest_entry(findings: usize, topics: Vec<&str>) -> ManifestEntry {
    ManifestEntry {
        id: ManifestEntryId::new(),
        file: "agent-outputs/research.md".to_string(),
        title: "research".to_string(),
        date: "2026-01-01".to_string(),
        status: ManifestStatus::Draft,
        topics: topics.into_iter().map(String::from).collect(),
        key_findings: (0..findings).map(|i| format!("finding {i}")).collect(),
        needs_followup: Vec::new(),
        linked_tasks: Vec::new(),
    }
}

#[test]
fn validate_research_accepts_well_formed_entry() {
    let entry = manifest_entry(3, vec!["auth"]);
    let result = validate_research(&entry, false, false);
    assert!(result.valid);
    assert_eq!(result.score, 100);
}

#[test]
fn validate_research_flags_finding_count_and_code_diff() {
    let entry = manifest_entry(1, vec!["auth"]);
    let result = validate_research(&entry, true, false);
    assert!(!result.valid);
    assert_eq!(result.violations.len(), 2);
}

#[test]
fn validate_research_strict_requires_topics() {
    let entry = manifest_entry(3, vec![]);
    let result = validate_research(&entry, false, true);
    assert!(result.valid); // SHOULD-only violation never fails validity
    assert_eq!(result.violations.len(), 1);
}

#[test]
fn validate_consensus_requires_two_options_and_majority() {
    let options = vec![VoteOption { label: "a".into(), confidence: 0.4 }, VoteOption { label: "b".into(), confidence: 0.4 }];
    let result = validate_consensus(&options, false);
    assert!(!result.valid);
}

#[test]
fn validate_consensus_accepts_clear_majority() {
    let options = vec![VoteOption { label: "a".into(), confidence: 0.8 }, VoteOption { label: "b".into(), confidence: 0.2 }];
    let result = validate_consensus(&options, false);
    assert!(result.valid);
}

#[test]
fn validate_specification_requires_keywords_version_and_scope() {
    let text = "This document has no normative language.";
    assert!(!validate_specification(text, false).valid);

    let good = "Scope: auth flows. Version 1. Clients MUST validate tokens.";
    assert!(validate_specification(good, false).valid);
}

#[test]
fn validate_decomposition_flags_over_cap_and_thin_descriptions() {
    let children = vec!["ok".to_string(), "a detailed description of the subtask".to_string()];
    let result = validate_decomposition(&children, 1, false);
    assert!(!result.valid); // over cap of 1
}

#[test]
fn validate_provenance_flags_untagged_symbols() {
    let tags = vec![
        ProvenanceTag { symbol: "fn foo".into(), task_id: Some("T001".into()) },
        ProvenanceTag { symbol: "fn bar".into(), task_id: None },
    ];
    let result = validate_provenance(&tags, false);
    assert!(!result.valid);
    assert_eq!(result.violations.len(), 1);
}

#[test]
fn validate_release_requires_semver_and_changelog() {
    assert!(!validate_release("not-a-version", true, false).valid);
    assert!(!validate_release("1.2.3", false, false).valid);
    assert!(validate_release("1.2.3", true, false).valid);
}
