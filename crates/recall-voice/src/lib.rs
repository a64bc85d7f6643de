// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice input for Recall: speech model download, audio capture, and
//! transcription into memory fields.

pub mod capture;
pub mod input;
pub mod model;

pub use capture::ClipRecorder;
pub use input::{VoiceInput, VoiceState, append_transcription};
pub use model::{ModelStatus, SpeechModelManager};
