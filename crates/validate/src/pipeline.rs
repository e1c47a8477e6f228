// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RCSD-IVTR protocol validators (spec §4.6).
//!
//! Each stage consumes whatever artifact it governs (a manifest entry, a
//! voting matrix, a spec document, ...) and returns a [`ProtocolResult`]:
//! a validity flag, a violation list tagged MUST/SHOULD, and a 0..100
//! score. Structured the way the teacher's protocol DTOs carry
//! `{valid, violations, score}`-shaped data end to end.

use cleo_core::ManifestEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the stage outright in strict mode.
    Must,
    /// Advisory only; never fails the stage.
    Should,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolViolation {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl ProtocolViolation {
    fn must(code: &str, message: impl Into<String>) -> Self {
        Self { code: code.to_string(), severity: Severity::Must, message: message.into() }
    }

    fn should(code: &str, message: impl Into<String>) -> Self {
        Self { code: code.to_string(), severity: Severity::Should, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolResult {
    pub valid: bool,
    pub violations: Vec<ProtocolViolation>,
    pub score: u8,
}

impl ProtocolResult {
    /// `strict` only controls which checks a stage function *runs* (some
    /// SHOULD-level checks are skipped outside strict mode); a MUST
    /// violation always fails validity regardless of strictness. Exit-code
    /// propagation on failure is a dispatch-layer concern, not this type's.
    fn from_violations(violations: Vec<ProtocolViolation>) -> Self {
        let must_count = violations.iter().filter(|v| v.severity == Severity::Must).count();
        let should_count = violations.iter().filter(|v| v.severity == Severity::Should).count();
        let valid = must_count == 0;
        let penalty = (must_count * 25 + should_count * 10).min(100);
        let score = (100u32.saturating_sub(penalty as u32)) as u8;
        Self { valid, violations, score }
    }
}

/// Research stage (exit 60): `agent_type=research`, 3..7 key findings,
/// no code changes in the diff. Strict mode additionally requires sources.
pub fn validate_research(entry: &ManifestEntry, diff_is_code_only: bool, strict: bool) -> ProtocolResult {
    let mut violations = Vec::new();
    let n = entry.key_findings.len();
    if !(3..=7).contains(&n) {
        violations.push(ProtocolViolation::must("RSCH-001", format!("expected 3..7 key findings, got {n}")));
    }
    if diff_is_code_only {
        violations.push(ProtocolViolation::must("RSCH-002", "research stage diff must not change code"));
    }
    if entry.topics.is_empty() && strict {
        violations.push(ProtocolViolation::should("RSCH-003", "sources/topics are recommended"));
    }
    ProtocolResult::from_violations(violations)
}

/// One option in a consensus voting matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub label: String,
    pub confidence: f64,
}

/// Consensus stage (exit 61): ≥2 options, confidences in `[0,1]`, weighted
/// winner ≥ 50%.
pub fn validate_consensus(options: &[VoteOption], _strict: bool) -> ProtocolResult {
    let mut violations = Vec::new();
    if options.len() < 2 {
        violations.push(ProtocolViolation::must("CONS-001", "voting matrix needs at least 2 options"));
    }
    if options.iter().any(|o| !(0.0..=1.0).contains(&o.confidence)) {
        violations.push(ProtocolViolation::must("CONS-002", "confidences must be in [0,1]"));
    }
    let total: f64 = options.iter().map(|o| o.confidence).sum();
    if total > 0.0 {
        let winner = options.iter().map(|o| o.confidence).fold(0.0_f64, f64::max);
        if winner / total < 0.5 {
            violations.push(ProtocolViolation::must("CONS-003", "no option reaches a 50% weighted majority"));
        }
    }
    ProtocolResult::from_violations(violations)
}

const RFC2119_KEYWORDS: &[&str] =
    &["MUST", "MUST NOT", "SHOULD", "SHOULD NOT", "MAY", "REQUIRED", "SHALL"];

/// Specification stage (exit 62): presence of RFC 2119 keywords, a version
/// marker, and a scope section.
pub fn validate_specification(text: &str, _strict: bool) -> ProtocolResult {
    let mut violations = Vec::new();
    if !RFC2119_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        violations.push(ProtocolViolation::must("SPEC-001", "no RFC 2119 keywords present (MUST/SHOULD/MAY/...)"));
    }
    if !text.to_lowercase().contains("version") {
        violations.push(ProtocolViolation::should("SPEC-002", "no version marker present"));
    }
    if !text.to_lowercase().contains("scope") {
        violations.push(ProtocolViolation::must("SPEC-003", "no scope section present"));
    }
    ProtocolResult::from_violations(violations)
}

/// Decomposition stage (exit 63): at most `sibling_cap` children, each with
/// a non-trivial description.
pub fn validate_decomposition(child_descriptions: &[String], sibling_cap: usize, _strict: bool) -> ProtocolResult {
    let mut violations = Vec::new();
    if child_descriptions.len() > sibling_cap {
        violations.push(ProtocolViolation::must(
            "DCMP-001",
            format!("{} children exceeds sibling cap {sibling_cap}", child_descriptions.len()),
        ));
    }
    for (i, desc) in child_descriptions.iter().enumerate() {
        if desc.trim().len() < 10 {
            violations.push(ProtocolViolation::should("DCMP-002", format!("child {i} has an unclear description")));
        }
    }
    ProtocolResult::from_violations(violations)
}

/// A provenance tag on a newly introduced function, referencing the task
/// that introduced it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceTag {
    pub symbol: String,
    pub task_id: Option<String>,
}

/// Shared by the Implementation (exit 64) and Contribution (exit 65)
/// stages: "same" per spec §4.6 — every new symbol must carry a
/// provenance tag referencing its task.
pub fn validate_provenance(tags: &[ProvenanceTag], _strict: bool) -> ProtocolResult {
    let violations = tags
        .iter()
        .filter(|t| t.task_id.is_none())
        .map(|t| ProtocolViolation::must("IMPL-001", format!("{} has no provenance tag", t.symbol)))
        .collect();
    ProtocolResult::from_violations(violations)
}

/// Release stage (exit 66): a semver string and a changelog entry present.
pub fn validate_release(version: &str, changelog_entry_present: bool, _strict: bool) -> ProtocolResult {
    let mut violations = Vec::new();
    if !is_semver(version) {
        violations.push(ProtocolViolation::must("RLSE-001", format!("{version:?} is not a valid semver")));
    }
    if !changelog_entry_present {
        violations.push(ProtocolViolation::must("RLSE-002", "no changelog entry for this release"));
    }
    ProtocolResult::from_violations(violations)
}

fn is_semver(v: &str) -> bool {
    let core = v.split(['-', '+']).next().unwrap_or(v);
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
