// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::{FakeClock, PolicyConfig, ProjectPaths};

fn ctx(dir: &std::path::Path) -> ProjectContext<FakeClock> {
    let paths = ProjectPaths::resolve(dir, |_| None);
    std::fs::create_dir_all(&paths.root).unwrap();
    ProjectContext::new(paths, PolicyConfig::default(), FakeClock::default())
}

#[test]
fn research_validates_a_recorded_entry() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    let entry = crate::manifest::record(
        &ctx,
        "notes.md".into(),
        "findings".into(),
        vec!["a".into(), "b".into(), "c".into()],
        crate::manifest::RecordOptions::default(),
    )
    .unwrap();

    let result = research(&ctx, &entry.id, false, false).unwrap();
    assert!(result.valid);
}

#[test]
fn research_fails_for_unknown_entry() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path());
    assert!(research(&ctx, &cleo_core::ManifestEntryId::new(), false, false).is_err());
}

#[test]
fn consensus_flags_fewer_than_two_options() {
    let options = vec![VoteOption { label: "only".into(), confidence: 1.0 }];
    let result = consensus(&options, false);
    assert!(!result.valid);
}

#[test]
fn specification_requires_scope_section() {
    let result = specification("This document MUST define behavior.", false);
    assert!(!result.valid);
}

#[test]
fn release_rejects_non_semver() {
    let result = release("not-a-version", true, false);
    assert!(!result.valid);
}
