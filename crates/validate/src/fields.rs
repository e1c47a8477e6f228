// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-field validators: pure functions from candidate input to a violation
//! or a normalised value (spec §4.2).

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// A single field-level or cross-entity rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), code: code.into(), message: message.into() }
    }
}

/// Normalise and validate a task title: trimmed, NFC, 1..120 graphemes
/// (spec §4.2).
pub fn validate_title(raw: &str) -> Result<String, Violation> {
    let normalized: String = raw.trim().nfc().collect();
    let len = normalized.graphemes(true).count();
    if len == 0 || len > 120 {
        return Err(Violation::new(
            "title",
            "E_INPUT_INVALID",
            format!("title must be 1..120 graphemes, got {len}"),
        ));
    }
    Ok(normalized)
}

/// Validate a label against `^[a-z0-9][a-z0-9-]{0,31}$`.
pub fn validate_label(label: &str) -> Result<(), Violation> {
    let bytes = label.as_bytes();
    let ok = !bytes.is_empty()
        && bytes.len() <= 32
        && bytes[0].is_ascii_lowercase_or_digit()
        && bytes[1..].iter().all(|&b| b.is_ascii_lowercase_or_digit() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(Violation::new("labels", "E_INPUT_INVALID", format!("invalid label: {label:?}")))
    }
}

trait AsciiLowerOrDigit {
    fn is_ascii_lowercase_or_digit(self) -> bool;
}

impl AsciiLowerOrDigit for u8 {
    fn is_ascii_lowercase_or_digit(self) -> bool {
        self.is_ascii_digit() || (self.is_ascii_lowercase())
    }
}

/// Deduplicate labels, preserving first-seen order (spec §4.2).
pub fn coalesce_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for label in labels {
        if seen.insert(label.clone()) {
            out.push(label);
        }
    }
    out
}

/// Validate a cancellation reason: 5..300 printable graphemes.
pub fn validate_cancellation_reason(reason: &str) -> Result<(), Violation> {
    let len = reason.graphemes(true).count();
    if len < 5 || len > 300 {
        return Err(Violation::new(
            "reason",
            "E_INPUT_INVALID",
            format!("cancellation reason must be 5..300 graphemes, got {len}"),
        ));
    }
    if reason.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return Err(Violation::new("reason", "E_INPUT_INVALID", "cancellation reason must be printable"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "fields_tests.rs"]
mod tests;
