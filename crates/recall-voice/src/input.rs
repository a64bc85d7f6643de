// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice-to-text for form fields.
//!
//! A recording artefact is removed once transcription finishes, whether it
//! succeeded, failed, or was refused because the speech model is not ready.

use std::path::PathBuf;
use std::sync::Arc;

use recall_core::{AudioRecorder, Capability, RecallError, TranscriptionAdapter};
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::model::SpeechModelManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum VoiceState {
    Idle,
    Recording,
    Transcribing,
}

/// Deletes the recording when dropped.
struct Artefact(PathBuf);

impl Drop for Artefact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!(path = %self.0.display(), "recording removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.0.display(), error = %e, "failed to remove recording"),
        }
    }
}

/// Returns the voice state to `Idle` when dropped.
struct ResetToIdle<'a>(&'a watch::Sender<VoiceState>);

impl Drop for ResetToIdle<'_> {
    fn drop(&mut self) {
        self.0.send_replace(VoiceState::Idle);
    }
}

pub struct VoiceInput {
    recorder: Arc<dyn AudioRecorder>,
    transcriber: Option<Arc<dyn TranscriptionAdapter>>,
    model: Arc<SpeechModelManager>,
    state: watch::Sender<VoiceState>,
}

impl VoiceInput {
    pub fn new(
        recorder: Arc<dyn AudioRecorder>,
        transcriber: Option<Arc<dyn TranscriptionAdapter>>,
        model: Arc<SpeechModelManager>,
    ) -> Self {
        let (state, _) = watch::channel(VoiceState::Idle);
        Self {
            recorder,
            transcriber,
            model,
            state,
        }
    }

    pub fn state(&self) -> VoiceState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<VoiceState> {
        self.state.subscribe()
    }

    pub fn model(&self) -> &Arc<SpeechModelManager> {
        &self.model
    }

    pub async fn start_recording(&self) -> Result<(), RecallError> {
        if self.state() != VoiceState::Idle {
            return Err(RecallError::Validation(format!(
                "voice input is busy ({})",
                self.state()
            )));
        }
        self.recorder.start().await?;
        self.state.send_replace(VoiceState::Recording);
        Ok(())
    }

    /// Stops the session and transcribes it.
    ///
    /// Returns `Ok(None)` when no session was active or the transcript is
    /// blank.
    pub async fn stop_and_transcribe(&self) -> Result<Option<String>, RecallError> {
        let _reset = ResetToIdle(&self.state);
        let Some(handle) = self.recorder.stop().await? else {
            return Ok(None);
        };
        let _artefact = Artefact(handle.path.clone());

        self.model.ensure_ready()?;
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            RecallError::unavailable(Capability::Transcription, "no transcriber configured")
        })?;

        self.state.send_replace(VoiceState::Transcribing);
        let text = transcriber.transcribe(&handle).await?;
        let text = text.trim();
        debug!(chars = text.len(), "transcription finished");
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    pub async fn cancel_recording(&self) -> Result<(), RecallError> {
        let _reset = ResetToIdle(&self.state);
        self.recorder.cancel().await
    }
}

/// Appends a transcript to a field value with a single space separator.
pub fn append_transcription(existing: &str, text: &str) -> String {
    let existing = existing.trim_end();
    let text = text.trim();
    match (existing.is_empty(), text.is_empty()) {
        (true, _) => text.to_string(),
        (false, true) => existing.to_string(),
        (false, false) => format!("{existing} {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_uses_single_space() {
        assert_eq!(append_transcription("", "blue bag"), "blue bag");
        assert_eq!(append_transcription("Blue", "bag"), "Blue bag");
        assert_eq!(append_transcription("Blue ", "  bag "), "Blue bag");
        assert_eq!(append_transcription("Blue", "   "), "Blue");
    }

    #[test]
    fn state_names() {
        assert_eq!(VoiceState::Transcribing.to_string(), "transcribing");
    }
}
