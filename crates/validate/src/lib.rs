// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cleo-validate: field and cross-entity validators, auto-repair, the
//! RCSD-IVTR protocol pipeline, and the contribution/consensus engine.

pub mod consensus;
pub mod cross;
pub mod fields;
pub mod pipeline;
pub mod repair;

pub use consensus::{
    Conflict, ConflictSeverity, ConflictType, Contribution, Synthesis, VoteOutcome, VoteResult, detect_conflicts,
    synthesize, vote,
};
pub use cross::{
    validate_depends_acyclic, validate_depends_exist, validate_depth, validate_parent_exists,
    validate_positions_contiguous, validate_single_active_per_scope, validate_unique_ids,
};
pub use fields::{coalesce_labels, validate_cancellation_reason, validate_label, validate_title, Violation};
pub use pipeline::{
    validate_consensus, validate_decomposition, validate_provenance, validate_release, validate_research,
    validate_specification, ProtocolResult, ProtocolViolation, ProvenanceTag, Severity, VoteOption,
};
pub use repair::{check_checksum, check_orphans, check_positions, ChecksumOutcome, OrphanPolicy};
