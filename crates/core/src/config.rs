// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project filesystem layout and policy configuration (spec §6.1, §6.4, §6.5).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `hierarchy.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyConfig {
    pub auto_complete_parent: bool,
    pub auto_complete_mode: AutoCompleteMode,
    pub max_siblings: u32,
    pub max_depth: u32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            auto_complete_parent: true,
            auto_complete_mode: AutoCompleteMode::Auto,
            max_siblings: 20,
            max_depth: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoCompleteMode {
    Auto,
    Off,
}

/// `validation.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    pub require_description: bool,
    pub phase_validation: PhaseValidationConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { require_description: false, phase_validation: PhaseValidationConfig::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseValidationConfig {
    pub warn_phase_context: bool,
    pub enforce_phase_order: bool,
}

/// `verification.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    pub require_for_parent_auto_complete: bool,
    pub gates: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { require_for_parent_auto_complete: false, gates: Vec::new() }
    }
}

/// `multiSession.*` and `session.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSessionConfig {
    pub enabled: bool,
    pub allow_scope_overlap: bool,
    pub require_session: bool,
}

impl Default for MultiSessionConfig {
    fn default() -> Self {
        Self { enabled: true, allow_scope_overlap: false, require_session: false }
    }
}

/// `duplicate.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateConfig {
    pub window_seconds: u64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self { window_seconds: 60 }
    }
}

/// `archive.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveConfig {
    pub auto_after_days: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { auto_after_days: 30 }
    }
}

/// `lock.*` policy keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockConfig {
    pub timeout_seconds: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { timeout_seconds: 5 }
    }
}

/// The full contents of `config.json` (spec §6.5). Loaded with
/// `serde_json` directly — no config-layering crate, matching the
/// teacher's `Config::load`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
    pub hierarchy: HierarchyConfig,
    pub validation: ValidationConfig,
    pub verification: VerificationConfig,
    pub multi_session: MultiSessionConfig,
    pub duplicate: DuplicateConfig,
    pub archive: ArchiveConfig,
    pub lock: LockConfig,
}

impl PolicyConfig {
    /// Load from a `config.json` path, falling back to defaults if the
    /// file doesn't exist yet (spec §7: "initialise if operation is `init`").
    pub fn load_or_default(path: &Path) -> Result<Self, crate::error::CleoError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Resolved on-disk paths for a project root, honoring the env-var
/// overrides of spec §6.4 (`CLEO_DIR`/`TODO_FILE`/`ARCHIVE_FILE`/
/// `LOG_FILE`/`CONFIG_FILE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub todo_file: PathBuf,
    pub archive_file: PathBuf,
    pub log_file: PathBuf,
    pub config_file: PathBuf,
    /// Session entities (spec §3.2/§4.5) aren't named in the filesystem
    /// layout alongside `todo.json`/`todo-archive.json` — they get the same
    /// treatment, one root document under `.cleo`, honoring `SESSIONS_FILE`
    /// for consistency with the other overrides.
    pub sessions_file: PathBuf,
    /// The append-only research/manifest JSONL index (spec §4.11). Not
    /// given a concrete filename in spec.md §6.1 beyond "manifests" living
    /// under `agent-outputs/`; resolved as an Open Question by naming it
    /// `agent-outputs/manifest.jsonl`, honoring `MANIFEST_FILE` for
    /// consistency with the other overrides.
    pub manifest_file: PathBuf,
    pub backups_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub agent_outputs_dir: PathBuf,
    pub adrs_dir: PathBuf,
}

impl ProjectPaths {
    /// Resolve paths rooted at `root`, applying any `env` overrides present.
    /// `env` is injected (rather than read from `std::env` directly) so
    /// tests can exercise overrides deterministically.
    pub fn resolve(root: impl Into<PathBuf>, env: impl Fn(&str) -> Option<String>) -> Self {
        let root = match env("CLEO_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => root.into().join(".cleo"),
        };
        let pick = |var: &str, default_name: &str| -> PathBuf {
            env(var).map(PathBuf::from).unwrap_or_else(|| root.join(default_name))
        };
        let agent_outputs_dir = root.join("agent-outputs");
        Self {
            todo_file: pick("TODO_FILE", "todo.json"),
            archive_file: pick("ARCHIVE_FILE", "todo-archive.json"),
            log_file: pick("LOG_FILE", "todo-log.json"),
            config_file: pick("CONFIG_FILE", "config.json"),
            sessions_file: pick("SESSIONS_FILE", "sessions.json"),
            manifest_file: env("MANIFEST_FILE").map(PathBuf::from).unwrap_or_else(|| agent_outputs_dir.join("manifest.jsonl")),
            backups_dir: root.join("backups"),
            cache_dir: root.join(".cache"),
            agent_outputs_dir,
            adrs_dir: root.join("adrs"),
            root,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
