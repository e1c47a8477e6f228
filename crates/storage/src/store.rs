// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic, single-writer JSON/JSONL file store (spec §4.1).
//!
//! The write path is "prepare temp file → validate it parses → commit via
//! rename → release lock", the same temp-file-then-rename discipline the
//! teacher's `Wal`/`Checkpointer` pair uses for its snapshot file, adapted
//! from append-log to rewrite-whole-document since `todo.json` is a
//! materialized document rather than an event log.

use crate::lock::{FileLockGuard, LockError};
use base64::Engine;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("file corrupted: {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("generated file failed to re-parse: {0}")]
    SchemaValidation(String),
}

impl From<LockError> for cleo_core::CleoError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Timeout(d, p) => cleo_core::CleoError::LockTimeout(d, p),
            LockError::Io { source, .. } => cleo_core::CleoError::Io(source),
        }
    }
}

impl From<StoreError> for cleo_core::CleoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(p) => cleo_core::CleoError::FileNotFound(p),
            StoreError::Corrupted { path, reason } => cleo_core::CleoError::FileCorrupted { path, reason },
            StoreError::Lock(inner) => inner.into(),
            StoreError::Write { path, source } => cleo_core::CleoError::FileWrite { path, source },
            StoreError::SchemaValidation(msg) => cleo_core::CleoError::ValidationSchema(msg),
        }
    }
}

/// Options controlling a [`Store::save`] call.
#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Snapshot the prior file into the backup directory before committing.
    pub backup: bool,
    pub lock_timeout: Duration,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { backup: false, lock_timeout: Duration::from_secs(5) }
    }
}

/// How many rotated backups to retain per primary file.
pub const BACKUP_RETAIN_COUNT: usize = 10;

pub struct Store {
    backups_dir: PathBuf,
}

impl Store {
    pub fn new(backups_dir: impl Into<PathBuf>) -> Self {
        Self { backups_dir: backups_dir.into() }
    }

    /// Parse a JSON document from disk.
    pub fn load(&self, path: &Path) -> Result<Value, StoreError> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Write { path: path.to_path_buf(), source: e }
            }
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupted { path: path.to_path_buf(), reason: e.to_string() })
    }

    /// Serialise and atomically overwrite `path`: acquire the lock, back up
    /// the existing file if requested, write to a `.tmp` sibling, verify it
    /// re-parses, then rename over the target.
    pub fn save(&self, path: &Path, value: &Value, opts: SaveOptions) -> Result<(), StoreError> {
        let lock_path = lock_path_for(path);
        let _guard = FileLockGuard::acquire(&lock_path, opts.lock_timeout)?;

        if opts.backup && path.exists() {
            self.rotate_backup(path)?;
        }

        let tmp_path = tmp_path_for(path);
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::SchemaValidation(e.to_string()))?;
        write_and_fsync(&tmp_path, &bytes)?;

        // Validate before committing: a temp file that doesn't re-parse
        // means serialisation produced garbage, and must not be swapped in.
        let reparsed = std::fs::read(&tmp_path)
            .map_err(|source| StoreError::Write { path: tmp_path.clone(), source })?;
        serde_json::from_slice::<Value>(&reparsed)
            .map_err(|e| StoreError::SchemaValidation(e.to_string()))?;

        std::fs::rename(&tmp_path, path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp_path);
            StoreError::Write { path: path.to_path_buf(), source }
        })?;
        debug!(path = %path.display(), "committed store write");
        Ok(())
    }

    /// Append a single JSON value as one line of a JSONL file, under the
    /// same lock discipline as [`Self::save`].
    pub fn append_line(&self, path: &Path, value: &Value, lock_timeout: Duration) -> Result<(), StoreError> {
        let lock_path = lock_path_for(path);
        let _guard = FileLockGuard::acquire(&lock_path, lock_timeout)?;

        let mut line = serde_json::to_vec(value).map_err(|e| StoreError::SchemaValidation(e.to_string()))?;
        serde_json::from_slice::<Value>(&line)
            .map_err(|e| StoreError::SchemaValidation(e.to_string()))?;
        line.push(b'\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
        file.write_all(&line).map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
        file.sync_all().map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
        Ok(())
    }

    /// Read back a JSONL file one value per line, skipping blank lines.
    /// A missing file is an empty index, not an error — mirrors the
    /// missing-document-is-default treatment the root JSON documents get.
    pub fn read_lines(&self, path: &Path) -> Result<Vec<Value>, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Write { path: path.to_path_buf(), source: e }),
        };
        let text = String::from_utf8_lossy(&bytes);
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| StoreError::Corrupted { path: path.to_path_buf(), reason: e.to_string() })
            })
            .collect()
    }

    fn rotate_backup(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.backups_dir)
            .map_err(|source| StoreError::Write { path: self.backups_dir.clone(), source })?;

        let stem = path.file_name().and_then(|n| n.to_str()).unwrap_or("file");
        let stamp = chrono_stamp();
        let backup_path = self.backups_dir.join(format!("{stem}.{stamp}.bak"));
        std::fs::copy(path, &backup_path)
            .map_err(|source| StoreError::Write { path: backup_path.clone(), source })?;

        self.prune_backups(stem)?;
        Ok(())
    }

    fn prune_backups(&self, stem: &str) -> Result<(), StoreError> {
        let prefix = format!("{stem}.");
        let mut entries: Vec<(std::time::SystemTime, PathBuf)> = std::fs::read_dir(&self.backups_dir)
            .map_err(|source| StoreError::Write { path: self.backups_dir.clone(), source })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(&prefix)))
            .filter_map(|p| std::fs::metadata(&p).ok().and_then(|m| m.modified().ok()).map(|t| (t, p)))
            .collect();
        entries.sort_by_key(|(t, _)| *t);
        if entries.len() > BACKUP_RETAIN_COUNT {
            let drop_count = entries.len() - BACKUP_RETAIN_COUNT;
            for (_, path) in entries.into_iter().take(drop_count) {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "failed to prune rotated backup");
                }
            }
        }
        Ok(())
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".lock");
    PathBuf::from(s)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".tmp");
    PathBuf::from(s)
}

fn write_and_fsync(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = std::fs::File::create(path).map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    file.write_all(bytes).map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    file.sync_all().map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    Ok(())
}

/// A filesystem-safe timestamp for backup filenames. Not parsed back, so
/// any monotonic, collision-resistant string will do; this one stays
/// sortable by name.
fn chrono_stamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:020}", now.as_nanos())
}

/// Compute the spec §3.5/§6.2 checksum: base64 of SHA-256 over the
/// canonical (id-sorted) JSON encoding of `items`.
pub fn compute_checksum<T: serde::Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(items)?;
    let digest = Sha256::digest(&bytes);
    Ok(base64::engine::general_purpose::STANDARD.encode(digest))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
