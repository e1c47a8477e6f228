// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single error taxonomy for the whole engine (spec §7).
//!
//! Lower crates (`cleo-storage`, `cleo-graph`, `cleo-validate`) define their
//! own narrow error enums and funnel into [`CleoError`] via `#[from]`, the
//! way `oj-daemon`'s `LifecycleError` wraps `oj-storage`'s `WalError`.

use std::path::PathBuf;
use thiserror::Error;

/// A protocol stage used in RCSD-IVTR violation codes (spec §4.6, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStage {
    Research,
    Consensus,
    Specification,
    Decomposition,
    Implementation,
    Validation,
    Testing,
    Release,
}

impl ProtocolStage {
    /// The exit code a strict-mode violation of this stage propagates.
    pub fn exit_code(self) -> i32 {
        match self {
            ProtocolStage::Research => 60,
            ProtocolStage::Consensus => 61,
            ProtocolStage::Specification => 62,
            ProtocolStage::Decomposition => 63,
            ProtocolStage::Implementation => 64,
            ProtocolStage::Validation | ProtocolStage::Testing => 65,
            ProtocolStage::Release => 66,
        }
    }

    pub fn code_prefix(self) -> &'static str {
        match self {
            ProtocolStage::Research => "RSCH",
            ProtocolStage::Consensus => "CONS",
            ProtocolStage::Specification => "SPEC",
            ProtocolStage::Decomposition => "DCMP",
            ProtocolStage::Implementation => "IMPL",
            ProtocolStage::Validation | ProtocolStage::Testing => "CONT",
            ProtocolStage::Release => "RLSE",
        }
    }
}

/// The engine-wide error type. Every domain handler, validator, and store
/// operation returns `Result<_, CleoError>`.
#[derive(Debug, Error)]
pub enum CleoError {
    #[error("required field missing: {0}")]
    InputMissing(String),

    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("unknown operation: {domain}.{operation}")]
    InvalidOperation { domain: String, operation: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("decision not found: {0}")]
    DecisionNotFound(String),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("task already completed: {0}")]
    TaskCompleted(String),

    #[error("no change: {0}")]
    NoChange(String),

    #[error("task has children: {0}")]
    HasChildren(String),

    #[error("dependency error: {0}")]
    DependencyError(String),

    #[error("id collision: {0}")]
    IdCollision(String),

    #[error("depth exceeded: {0}")]
    DepthExceeded(String),

    #[error("invalid parent type: {0}")]
    InvalidParentType(String),

    #[error("failed to write file {path}: {source}")]
    FileWrite { path: PathBuf, #[source] source: std::io::Error },

    #[error("file corrupted: {path}: {reason}")]
    FileCorrupted { path: PathBuf, reason: String },

    #[error("lock timeout after {0:?} on {1}")]
    LockTimeout(std::time::Duration, PathBuf),

    #[error("schema validation failed: {0}")]
    ValidationSchema(String),

    #[error("checksum mismatch on {path}: stored {stored}, computed {computed}")]
    ChecksumMismatch { path: PathBuf, stored: String, computed: String },

    #[error("{stage:?} protocol violation [{code}]: {message}")]
    ProtocolViolation { stage: ProtocolStage, code: String, message: String },

    #[error("unknown protocol stage: {0}")]
    UnknownProtocol(String),

    #[error("rate limit exceeded for gateway {0}")]
    RateLimited(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CleoError {
    /// The machine-readable `E_*`/protocol code for this error (spec §7).
    pub fn code(&self) -> String {
        match self {
            CleoError::InputMissing(_) => "E_INPUT_MISSING".into(),
            CleoError::InputInvalid(_) => "E_INPUT_INVALID".into(),
            CleoError::InvalidOperation { .. } => "E_INVALID_OPERATION".into(),
            CleoError::TaskNotFound(_) => "E_TASK_NOT_FOUND".into(),
            CleoError::SessionNotFound(_) => "E_SESSION_NOT_FOUND".into(),
            CleoError::DecisionNotFound(_) => "E_DECISION_NOT_FOUND".into(),
            CleoError::FileNotFound(_) => "E_FILE_NOT_FOUND".into(),
            CleoError::TaskCompleted(_) => "E_TASK_COMPLETED".into(),
            CleoError::NoChange(_) => "E_NO_CHANGE".into(),
            CleoError::HasChildren(_) => "E_HAS_CHILDREN".into(),
            CleoError::DependencyError(_) => "E_DEPENDENCY_ERROR".into(),
            CleoError::IdCollision(_) => "E_ID_COLLISION".into(),
            CleoError::DepthExceeded(_) => "E_DEPTH_EXCEEDED".into(),
            CleoError::InvalidParentType(_) => "E_INVALID_PARENT_TYPE".into(),
            CleoError::FileWrite { .. } => "E_FILE_WRITE".into(),
            CleoError::FileCorrupted { .. } => "E_FILE_CORRUPTED".into(),
            CleoError::LockTimeout(..) => "E_LOCK_TIMEOUT".into(),
            CleoError::ValidationSchema(_) => "E_VALIDATION_SCHEMA".into(),
            CleoError::ChecksumMismatch { .. } => "E_VALIDATION_SCHEMA".into(),
            CleoError::ProtocolViolation { stage, code, .. } => format!("{}-{}", stage.code_prefix(), code),
            CleoError::UnknownProtocol(_) => "E_UNKNOWN_PROTOCOL".into(),
            CleoError::RateLimited(_) => "E_RATE_LIMITED".into(),
            CleoError::Io(_) => "E_FILE_WRITE".into(),
            CleoError::Json(_) => "E_VALIDATION_SCHEMA".into(),
            CleoError::Internal(_) => "E_INTERNAL".into(),
        }
    }

    /// The canonical CLI exit code for this error (spec §6.3).
    pub fn exit_code(&self) -> i32 {
        match self {
            CleoError::InputMissing(_) | CleoError::InputInvalid(_) => 1,
            CleoError::InvalidOperation { .. } => 1,
            CleoError::TaskNotFound(_)
            | CleoError::SessionNotFound(_)
            | CleoError::DecisionNotFound(_) => 4,
            CleoError::FileNotFound(_) => 3,
            CleoError::TaskCompleted(_) => 17,
            CleoError::NoChange(_) => 102,
            CleoError::HasChildren(_) => 16,
            CleoError::DependencyError(_) => 5,
            CleoError::IdCollision(_) => 6,
            CleoError::DepthExceeded(_) => 11,
            CleoError::InvalidParentType(_) => 13,
            CleoError::FileWrite { .. } | CleoError::Io(_) => 3,
            CleoError::FileCorrupted { .. } => 3,
            CleoError::LockTimeout(..) => 3,
            CleoError::ValidationSchema(_) | CleoError::ChecksumMismatch { .. } | CleoError::Json(_) => 6,
            CleoError::ProtocolViolation { stage, .. } => stage.exit_code(),
            CleoError::UnknownProtocol(_) => 67,
            CleoError::RateLimited(_) => 8,
            CleoError::Internal(_) => 1,
        }
    }

    /// An actionable fix suggestion when one is known (spec §7).
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CleoError::TaskNotFound(id) => {
                Some(format!("Use 'cleo find {}' to search for a similar task", id))
            }
            CleoError::HasChildren(_) => {
                Some("Pass --children cascade or --children orphan to handle descendants".into())
            }
            CleoError::DependencyError(_) => {
                Some("Complete or cancel the blocking dependency first".into())
            }
            CleoError::LockTimeout(..) => {
                Some("Another cleo process is writing; retry, or raise lock.timeoutSeconds".into())
            }
            CleoError::RateLimited(gateway) => Some(format!("Slow down calls to the {gateway} gateway and retry")),
            _ => None,
        }
    }
}
