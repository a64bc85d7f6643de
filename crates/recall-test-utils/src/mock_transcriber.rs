// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock speech-to-text adapter.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use recall_core::{
    AdapterType, AudioHandle, Capability, HealthStatus, PluginAdapter, RecallError,
    TranscriptionAdapter,
};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
    Unavailable,
}

/// Returns a fixed transcript and records which files it was handed.
///
/// A recorded call also notes whether the file still existed at the time,
/// so tests can assert cleanup happens after transcription.
pub struct MockTranscriber {
    reply: Reply,
    calls: Mutex<Vec<(PathBuf, bool)>>,
}

impl MockTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Fails every call with a provider error.
    pub fn failing() -> Self {
        Self::with_reply(Reply::Fail)
    }

    pub fn unavailable() -> Self {
        Self::with_reply(Reply::Unavailable)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(path, existed)` for every call so far.
    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockTranscriber {
    fn name(&self) -> &str {
        "mock-transcriber"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transcription
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl TranscriptionAdapter for MockTranscriber {
    async fn transcribe(&self, handle: &AudioHandle) -> Result<String, RecallError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((handle.path.clone(), handle.path.exists()));
        }
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(RecallError::Provider {
                message: "mock transcription failed".into(),
                source: None,
            }),
            Reply::Unavailable => Err(RecallError::unavailable(
                Capability::Transcription,
                "mock model not loaded",
            )),
        }
    }
}
