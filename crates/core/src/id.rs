// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID types for tasks, sessions, and the research/manifest index.
//!
//! `TaskId` is a sequential `T[0-9]{3,}` id (spec §3.1) so it gets a
//! hand-written `next()`/`parse()` instead of the random-suffix shape used
//! by the other id types. `SessionId` and `ManifestEntryId` keep the
//! `{prefix}{suffix}` shape oj's ids use, generated via [`define_id!`].

use std::fmt;

/// Maximum byte length for an inline id buffer.
pub const ID_MAX_LEN: usize = 40;

/// Fixed-size inline id buffer. Always ≤ [`ID_MAX_LEN`] ASCII bytes, `Copy`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdBuf {
    len: u8,
    buf: [u8; ID_MAX_LEN],
}

impl PartialOrd for IdBuf {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IdBuf {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl IdBuf {
    pub fn new(s: &str) -> Self {
        debug_assert!(s.len() <= ID_MAX_LEN, "id exceeds {} bytes: {:?}", ID_MAX_LEN, s);
        let len = s.len().min(ID_MAX_LEN);
        let mut buf = [0u8; ID_MAX_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or_default()
    }
}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > ID_MAX_LEN {
            return Err(serde::de::Error::custom(format!("id exceeds {} bytes: {:?}", ID_MAX_LEN, s)));
        }
        Ok(IdBuf::new(&s))
    }
}

/// Invalid task id: doesn't match `T[0-9]{3,}`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid task id {0:?}: expected T followed by 3+ digits")]
pub struct InvalidTaskId(pub String);

/// Unique identifier for a task (`T001`, `T002`, ... `T[0-9]{3,}`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(IdBuf);

impl TaskId {
    /// Parse a task id from its string form, validating `^T[0-9]{3,}$`.
    pub fn parse(s: &str) -> Result<Self, InvalidTaskId> {
        let digits = s.strip_prefix('T').ok_or_else(|| InvalidTaskId(s.to_string()))?;
        if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTaskId(s.to_string()));
        }
        Ok(Self(IdBuf::new(s)))
    }

    /// Build the id for a given numeric suffix, left-padded to 3 digits
    /// (spec §4.4 `add`: `id = next numeric id ≥ max(existing)+1`).
    pub fn from_number(n: u32) -> Self {
        Self(IdBuf::new(&format!("T{:03}", n)))
    }

    /// The next id after the highest numeric id currently in use (live+archive).
    pub fn next_after<'a>(existing: impl Iterator<Item = &'a TaskId>) -> Self {
        let max = existing.filter_map(|id| id.number()).max().unwrap_or(0);
        Self::from_number(max + 1)
    }

    /// The numeric suffix, if the id is well-formed.
    pub fn number(&self) -> Option<u32> {
        self.0.as_str().strip_prefix('T')?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = InvalidTaskId;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

/// Define a newtype id wrapper around [`IdBuf`] with a fixed prefix and a
/// random suffix (`{prefix}{nanoid}`).
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal, $suffix_len:literal);
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name($crate::id::IdBuf);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self($crate::id::IdBuf::new(&format!(
                    "{}{}",
                    Self::PREFIX,
                    nanoid::nanoid!($suffix_len)
                )))
            }

            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self($crate::id::IdBuf::new(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

crate::define_id! {
    /// Research/manifest artifact identifier (`rsch_<nanoid>`).
    pub struct ManifestEntryId("rsch_", 12);
}

crate::define_id! {
    /// Audit-log entry identifier (`log_<nanoid>`).
    pub struct LogEntryId("log_", 12);
}

/// A session id: `session_YYYYMMDD_HHMMSS_<hex>` (spec §3.2).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(IdBuf);

impl SessionId {
    /// Generate a new session id stamped with the clock's current time.
    pub fn generate(epoch_ms: u64) -> Self {
        let dt = chrono::DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_default();
        let stamp = dt.format("%Y%m%d_%H%M%S");
        let alphabet: Vec<char> = "0123456789abcdef".chars().collect();
        let hex = nanoid::nanoid!(8, &alphabet);
        Self(IdBuf::new(&format!("session_{}_{}", stamp, hex)))
    }

    pub fn from_string(id: impl AsRef<str>) -> Self {
        Self(IdBuf::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
