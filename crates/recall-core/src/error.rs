// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Recall crate.

use thiserror::Error;

use crate::types::Capability;

/// The primary error type used across all Recall adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The persistence medium cannot be used in this session.
    ///
    /// Permanent for the session: callers should not retry.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// Storage backend errors (query failure, serialization, I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An operation referenced a memory id that does not exist.
    #[error("memory {id} not found")]
    NotFound { id: i64 },

    /// An injected capability (embedding, completion, transcription) is not ready.
    ///
    /// Triggers graceful fallback rather than a hard failure.
    #[error("{capability} capability unavailable: {reason}")]
    CapabilityUnavailable {
        capability: Capability,
        reason: String,
    },

    /// A stored embedding could not be parsed.
    #[error("malformed embedding: {0}")]
    MalformedEmbedding(String),

    /// Input rejected by a record invariant (empty item name or location, etc.).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Model runtime errors (HTTP failure, unexpected response shape).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Shorthand for a [`RecallError::CapabilityUnavailable`].
    pub fn unavailable(capability: Capability, reason: impl Into<String>) -> Self {
        RecallError::CapabilityUnavailable {
            capability,
            reason: reason.into(),
        }
    }

    /// Wraps any error as a [`RecallError::Storage`].
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RecallError::Storage {
            source: Box::new(source),
        }
    }

    /// Returns true when this error means "the capability is absent", which
    /// callers treat as a policy fallback rather than a failure.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, RecallError::CapabilityUnavailable { .. })
    }
}
