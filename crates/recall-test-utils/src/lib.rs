// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recall integration tests.
//!
//! Provides mock model adapters and test harness infrastructure for fast,
//! deterministic tests without a model runtime.
//!
//! # Components
//!
//! - [`MockEmbedder`] - pinned or letter-frequency embeddings
//! - [`MockCompleter`] - queued answers, records prompts
//! - [`MockTranscriber`] - fixed transcript, records handed files
//! - [`TestHarness`] - store + index + orchestrator in a temp directory

pub mod harness;
pub mod mock_completer;
pub mod mock_embedder;
pub mod mock_transcriber;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_completer::MockCompleter;
pub use mock_embedder::{MockEmbedder, letter_vector};
pub use mock_transcriber::MockTranscriber;
