// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory exclusive file locking with exponential backoff (spec §4.1).
//!
//! Grounded on `fs2::FileExt::try_lock_exclusive()` as used at daemon
//! startup, generalized from a single blocking attempt into a retry loop
//! since every read-modify-write against `todo.json` needs the lock, not
//! just process startup.

use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock timeout after {0:?} on {1}")]
    Timeout(Duration, PathBuf),
    #[error("io error locking {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// An exclusive advisory lock on a sidecar `.lock` file, held for the
/// lifetime of the guard. Released automatically on drop.
pub struct FileLockGuard {
    file: File,
    path: PathBuf,
}

impl FileLockGuard {
    /// Acquire the lock at `lock_path`, retrying with exponential backoff
    /// (5ms, doubling, capped at 250ms) until `timeout` elapses.
    pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|source| LockError::Io { path: lock_path.to_path_buf(), source })?;

        let deadline = Instant::now() + timeout;
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file, path: lock_path.to_path_buf() }),
                Err(_) if Instant::now() >= deadline => {
                    return Err(LockError::Timeout(timeout, lock_path.to_path_buf()));
                }
                Err(_) => {
                    std::thread::sleep(backoff.min(deadline.saturating_duration_since(Instant::now())));
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
