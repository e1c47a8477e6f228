// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contribution/consensus engine (spec §4.12): pairwise conflict detection
//! across independently recorded answers, weighted voting, and synthesis
//! with a human-in-the-loop flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One session's recorded answer to a question, feeding into a vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub session_id: String,
    pub question_id: String,
    pub answer: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictType {
    /// Answers share no common substance.
    Contradiction,
    /// One answer is a subset or superset of the other.
    PartialOverlap,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub question_id: String,
    pub a: Contribution,
    pub b: Contribution,
    pub kind: ConflictType,
    pub severity: ConflictSeverity,
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn classify_conflict(a: &str, b: &str) -> ConflictType {
    let (na, nb) = (normalize(a), normalize(b));
    if na == nb {
        return ConflictType::PartialOverlap;
    }
    if na.contains(&nb) || nb.contains(&na) {
        ConflictType::PartialOverlap
    } else {
        ConflictType::Contradiction
    }
}

fn severity_for(ca: f64, cb: f64) -> ConflictSeverity {
    if ca >= 0.8 && cb >= 0.8 {
        ConflictSeverity::Critical
    } else if ca >= 0.6 && cb >= 0.6 {
        ConflictSeverity::High
    } else if ca >= 0.5 && cb >= 0.5 {
        ConflictSeverity::Medium
    } else {
        ConflictSeverity::Low
    }
}

/// Pairwise-compare every contribution to the same question and report
/// conflicts where the normalized answers disagree.
pub fn detect_conflicts(contributions: &[Contribution]) -> Vec<Conflict> {
    let mut by_question: BTreeMap<&str, Vec<&Contribution>> = BTreeMap::new();
    for c in contributions {
        by_question.entry(c.question_id.as_str()).or_default().push(c);
    }

    let mut conflicts = Vec::new();
    for (question_id, group) in by_question {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (a, b) = (group[i], group[j]);
                if normalize(&a.answer) == normalize(&b.answer) {
                    continue;
                }
                conflicts.push(Conflict {
                    question_id: question_id.to_string(),
                    a: a.clone(),
                    b: b.clone(),
                    kind: classify_conflict(&a.answer, &b.answer),
                    severity: severity_for(a.confidence, b.confidence),
                });
            }
        }
    }
    conflicts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    /// Every contribution agreed on the same normalized answer.
    Unanimous,
    /// One answer carries a strict majority of confidence weight.
    Majority,
    /// No answer reaches a majority; requires human resolution.
    Split,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub question_id: String,
    pub winner: Option<String>,
    pub weight: f64,
    pub total_weight: f64,
    pub outcome: VoteOutcome,
}

/// Tally contributions to a single question by normalized answer, summing
/// confidence as vote weight.
pub fn vote(question_id: &str, contributions: &[Contribution]) -> VoteResult {
    let relevant: Vec<&Contribution> = contributions.iter().filter(|c| c.question_id == question_id).collect();
    let total_weight: f64 = relevant.iter().map(|c| c.confidence).sum();

    let mut tally: BTreeMap<String, (String, f64)> = BTreeMap::new();
    for c in &relevant {
        let key = normalize(&c.answer);
        let entry = tally.entry(key).or_insert_with(|| (c.answer.clone(), 0.0));
        entry.1 += c.confidence;
    }

    let winner_entry = tally.values().max_by(|a, b| a.1.total_cmp(&b.1)).cloned();
    let distinct_answers = tally.len();

    let outcome = match (distinct_answers, &winner_entry) {
        (0, _) => VoteOutcome::Split,
        (1, _) => VoteOutcome::Unanimous,
        (_, Some((_, weight))) if total_weight > 0.0 && *weight / total_weight > 0.5 => VoteOutcome::Majority,
        _ => VoteOutcome::Split,
    };

    VoteResult {
        question_id: question_id.to_string(),
        winner: winner_entry.as_ref().map(|(answer, _)| answer.clone()),
        weight: winner_entry.map(|(_, w)| w).unwrap_or(0.0),
        total_weight,
        outcome,
    }
}

/// Synthesis document compiled from every question's vote, flagged for
/// human review if any question split.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub votes: Vec<VoteResult>,
    pub conflicts: Vec<Conflict>,
    pub hitl_required: bool,
}

/// Vote every question present in `contributions`, detect conflicts, and
/// compile the synthesis document.
pub fn synthesize(contributions: &[Contribution]) -> Synthesis {
    let mut question_ids: Vec<&str> = contributions.iter().map(|c| c.question_id.as_str()).collect();
    question_ids.sort_unstable();
    question_ids.dedup();

    let votes: Vec<VoteResult> = question_ids.iter().map(|q| vote(q, contributions)).collect();
    let conflicts = detect_conflicts(contributions);
    let hitl_required = votes.iter().any(|v| v.outcome == VoteOutcome::Split)
        || conflicts.iter().any(|c| c.severity >= ConflictSeverity::High);

    Synthesis { votes, conflicts, hitl_required }
}

#[cfg(test)]
#[path = "consensus_tests.rs"]
mod tests;
