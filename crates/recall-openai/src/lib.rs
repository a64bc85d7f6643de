// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model runtime adapters for any OpenAI-compatible server (Ollama,
//! llama.cpp server, LocalAI, whisper.cpp server).
//!
//! Each adapter reports an unreachable runtime as
//! [`recall_core::RecallError::CapabilityUnavailable`], so the memory core
//! can degrade instead of failing.

pub mod client;
pub mod completer;
pub mod embedder;
pub mod transcriber;
pub mod types;

pub use client::OpenAiClient;
pub use completer::OpenAiCompleter;
pub use embedder::OpenAiEmbedder;
pub use transcriber::OpenAiTranscriber;
