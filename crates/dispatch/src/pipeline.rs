// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline Domain operations (spec §4.6): the RCSD-IVTR protocol stage
//! validators, exposed one dispatch operation per stage. All but `research`
//! are pure pass-throughs to `cleo_validate::pipeline`; `research` first
//! loads the manifest entry it validates, the same load-then-delegate shape
//! `tools.rs` uses for graph queries.

use crate::context::ProjectContext;
use cleo_core::{CleoError, Clock, ManifestEntryId};
use cleo_validate::{
    validate_consensus, validate_decomposition, validate_provenance, validate_release, validate_research,
    validate_specification, ProtocolResult, ProvenanceTag, VoteOption,
};

pub fn research<C: Clock>(
    ctx: &ProjectContext<C>,
    entry_id: &ManifestEntryId,
    diff_is_code_only: bool,
    strict: bool,
) -> Result<ProtocolResult, CleoError> {
    let entry = crate::manifest::find_entry(ctx, entry_id)?;
    Ok(validate_research(&entry, diff_is_code_only, strict))
}

pub fn consensus(options: &[VoteOption], strict: bool) -> ProtocolResult {
    validate_consensus(options, strict)
}

pub fn specification(text: &str, strict: bool) -> ProtocolResult {
    validate_specification(text, strict)
}

pub fn decomposition(child_descriptions: &[String], sibling_cap: usize, strict: bool) -> ProtocolResult {
    validate_decomposition(child_descriptions, sibling_cap, strict)
}

pub fn provenance(tags: &[ProvenanceTag], strict: bool) -> ProtocolResult {
    validate_provenance(tags, strict)
}

pub fn release(version: &str, changelog_entry_present: bool, strict: bool) -> ProtocolResult {
    validate_release(version, changelog_entry_present, strict)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
