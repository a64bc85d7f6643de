// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech-to-text adapter trait.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AudioHandle;

/// Adapter that turns a finished recording into text.
#[async_trait]
pub trait TranscriptionAdapter: PluginAdapter {
    /// Transcribes the audio behind `handle`. Does not delete the file.
    async fn transcribe(&self, handle: &AudioHandle) -> Result<String, RecallError>;
}
