// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn contribution(session: &str, question: &str, answer: &str, confidence: f64) -> Contribution {
    Contribution {
        session_id: session.to_string(),
        question_id: question.to_string(),
        answer: answer.to_string(),
        confidence,
    }
}

#[test]
fn consensus_vote_picks_weighted_majority() {
    let contributions = vec![
        contribution("S001", "Q1", "use postgres", 0.9),
        contribution("S002", "Q1", "use postgres", 0.7),
        contribution("S003", "Q1", "use sqlite", 0.3),
    ];
    let result = consensus_vote("Q1", &contributions);
    assert_eq!(result.winner.as_deref(), Some("use postgres"));
}

#[test]
fn consensus_synthesize_flags_hitl_on_split() {
    let contributions = vec![
        contribution("S001", "Q1", "use postgres", 0.5),
        contribution("S002", "Q1", "use sqlite", 0.5),
    ];
    let synthesis = consensus_synthesize(&contributions);
    assert!(synthesis.hitl_required);
}

#[test]
fn conflicts_reports_disagreeing_answers() {
    let contributions =
        vec![contribution("S001", "Q1", "use postgres", 0.9), contribution("S002", "Q1", "use sqlite", 0.9)];
    assert_eq!(conflicts(&contributions).len(), 1);
}
