// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checksum-gated on-disk cache under `.cache/` (spec §4.3).
//!
//! Generic over the cached payload so `cleo-graph`'s derived indices can be
//! round-tripped without this crate depending on `cleo-graph` — grounded on
//! `load_snapshot`'s checksum-stamped snapshot envelope in
//! `crates/daemon/src/storage/mod.rs`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope<T> {
    /// Checksum of the canonical source data this cache was built from.
    pub source_checksum: String,
    pub payload: T,
}

pub struct Cache {
    path: PathBuf,
}

impl Cache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the cached payload if present and its stamped checksum matches
    /// `expected_checksum`. Any read/parse failure or checksum mismatch is
    /// treated as a cold-start miss, not an error — the cache is optional.
    pub fn load<T: for<'de> Deserialize<'de>>(&self, expected_checksum: &str) -> Option<T> {
        let bytes = std::fs::read(&self.path).ok()?;
        let envelope: CacheEnvelope<T> = serde_json::from_slice(&bytes).ok()?;
        if envelope.source_checksum != expected_checksum {
            return None;
        }
        Some(envelope.payload)
    }

    /// Write the payload stamped with the checksum of the data it was
    /// derived from. Best-effort: callers should not fail a mutation just
    /// because the cache couldn't be written.
    pub fn store<T: Serialize>(&self, source_checksum: &str, payload: &T) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let envelope = CacheEnvelope { source_checksum: source_checksum.to_string(), payload };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        std::fs::write(&self.path, bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
