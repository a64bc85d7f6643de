// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audio capture trait.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AudioHandle;

/// A recording session source. One session at a time.
#[async_trait]
pub trait AudioRecorder: PluginAdapter {
    /// Begins a recording session.
    async fn start(&self) -> Result<(), RecallError>;

    /// Ends the session and returns the captured audio, or `None` if no
    /// session was active.
    async fn stop(&self) -> Result<Option<AudioHandle>, RecallError>;

    /// Abandons the active session, discarding anything captured so far.
    async fn cancel(&self) -> Result<(), RecallError>;
}
