// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nexus Domain operations (spec §4.12): tally a contribution vote, detect
//! conflicts and synthesize a decision. Thin pass-throughs to
//! `cleo_validate::consensus` — these compute over caller-supplied
//! contributions and touch no project state, so unlike `tasks.rs`/
//! `sessions.rs` there is nothing to load or commit.

use cleo_validate::{detect_conflicts, synthesize, vote, Conflict, Contribution, Synthesis, VoteResult};

pub fn consensus_vote(question_id: &str, contributions: &[Contribution]) -> VoteResult {
    vote(question_id, contributions)
}

pub fn consensus_synthesize(contributions: &[Contribution]) -> Synthesis {
    synthesize(contributions)
}

pub fn conflicts(contributions: &[Contribution]) -> Vec<Conflict> {
    detect_conflicts(contributions)
}

#[cfg(test)]
#[path = "nexus_tests.rs"]
mod tests;
