// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin Domain operations (SPEC_FULL.md §10): project-root lifecycle and
//! health diagnostics. `init` is the one operation every other domain
//! handler's `load()` silently tolerates the absence of (spec §7's
//! "initialise if operation is `init`" recovery rule) — everywhere else a
//! missing `.cleo/` is just an empty default, but `init` is what actually
//! lays the directory tree and default `config.json` down on disk.

use crate::context::ProjectContext;
use crate::state::{ArchiveFile, SessionsFile, TodoFile};
use cleo_core::{CleoError, Clock, PolicyConfig};
use cleo_validate::Violation;
use serde::Serialize;

/// Which parts of a fresh project root `init` had to create. All `false`
/// on a second `init` against an already-initialised root.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    pub created_root: bool,
    pub created_todo: bool,
    pub created_archive: bool,
    pub created_sessions: bool,
    pub created_config: bool,
}

/// Create `.cleo/` and its root documents if they don't already exist
/// (SPEC_FULL.md §10 `cleo init`). Idempotent: re-running against an
/// initialised root is a no-op that reports nothing created.
pub fn init<C: Clock>(ctx: &ProjectContext<C>) -> Result<InitReport, CleoError> {
    let mut report = InitReport { created_root: !ctx.paths.root.exists(), ..Default::default() };

    for dir in [&ctx.paths.root, &ctx.paths.backups_dir, &ctx.paths.cache_dir, &ctx.paths.agent_outputs_dir, &ctx.paths.adrs_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| CleoError::FileWrite { path: dir.clone(), source })?;
        }
    }

    if !ctx.paths.todo_file.exists() {
        TodoFile::default().save(&ctx.store, &ctx.paths.todo_file, ctx.lock_timeout())?;
        report.created_todo = true;
    }
    if !ctx.paths.archive_file.exists() {
        ArchiveFile::default().save(&ctx.store, &ctx.paths.archive_file, ctx.lock_timeout())?;
        report.created_archive = true;
    }
    if !ctx.paths.sessions_file.exists() {
        SessionsFile::default().save(&ctx.store, &ctx.paths.sessions_file, ctx.lock_timeout())?;
        report.created_sessions = true;
    }
    if !ctx.paths.config_file.exists() {
        let value = serde_json::to_vec_pretty(&PolicyConfig::default())?;
        std::fs::write(&ctx.paths.config_file, value)
            .map_err(|source| CleoError::FileWrite { path: ctx.paths.config_file.clone(), source })?;
        report.created_config = true;
    }

    Ok(report)
}

/// A single finding from `doctor` (SPEC_FULL.md §10), separate from
/// [`Violation`] because some checks (missing files, checksum drift)
/// aren't cross-entity task violations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthFinding {
    pub code: String,
    pub message: String,
}

impl From<Violation> for HealthFinding {
    fn from(v: Violation) -> Self {
        Self { code: v.code, message: v.message }
    }
}

/// Read-only project-root health report (SPEC_FULL.md §10 `cleo doctor`):
/// missing files, checksum drift, and every cross-entity violation
/// `check.validate` would report. Never mutates anything.
pub fn doctor<C: Clock>(ctx: &ProjectContext<C>, max_depth: u32) -> Result<Vec<HealthFinding>, CleoError> {
    let mut findings = Vec::new();

    if !ctx.paths.config_file.exists() {
        findings.push(HealthFinding { code: "E_FILE_NOT_FOUND".into(), message: "config.json missing; run admin.init".into() });
    }

    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let mut sorted = todo.tasks.clone();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    let computed = cleo_storage::compute_checksum(&sorted)?;
    match &todo.meta.checksum {
        Some(stored) if stored != &computed => {
            findings.push(HealthFinding {
                code: "E_VALIDATION_SCHEMA".into(),
                message: format!("todo.json checksum drift: stored {stored}, computed {computed}"),
            });
        }
        None if !todo.tasks.is_empty() => {
            findings.push(HealthFinding { code: "E_VALIDATION_SCHEMA".into(), message: "todo.json has tasks but no checksum".into() });
        }
        _ => {}
    }

    findings.extend(crate::check::validate(ctx, max_depth)?.into_iter().map(HealthFinding::from));
    Ok(findings)
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
