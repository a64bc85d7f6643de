// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Recall.
//!
//! This crate provides the foundational trait definitions, error types, and
//! memory record types used throughout the Recall workspace. Storage
//! backends and model adapters implement the traits defined here, so the
//! memory core never depends on a concrete runtime.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RecallError;
pub use types::{
    AdapterType, AudioHandle, Capability, HealthStatus, MemoryFields, MemoryRecord,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    AudioRecorder, CompletionAdapter, EmbeddingAdapter, MemoryBackend, PluginAdapter,
    TranscriptionAdapter,
};
