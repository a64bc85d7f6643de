// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audio capture from pre-recorded clips.
//!
//! [`ClipRecorder`] stands in for a microphone: a session records whichever
//! clip was loaded before `start`, and `stop` copies it into a private
//! scratch directory. The copy is the recording artefact handed to
//! transcription; the source clip is never touched.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use recall_core::{AdapterType, AudioHandle, AudioRecorder, HealthStatus, PluginAdapter, RecallError};
use tracing::{debug, warn};

pub struct ClipRecorder {
    scratch_dir: PathBuf,
    pending: Mutex<Option<PathBuf>>,
    session: Mutex<Option<PathBuf>>,
    counter: AtomicU64,
}

impl ClipRecorder {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            pending: Mutex::new(None),
            session: Mutex::new(None),
            counter: AtomicU64::new(0),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Forgets a loaded clip that no session has picked up.
    pub fn unload(&self) -> Result<(), RecallError> {
        lock(&self.pending)?.take();
        Ok(())
    }

    /// Sets the clip the next session will record.
    pub fn load(&self, clip: impl Into<PathBuf>) -> Result<(), RecallError> {
        *lock(&self.pending)? = Some(clip.into());
        Ok(())
    }

    pub fn is_recording(&self) -> Result<bool, RecallError> {
        Ok(lock(&self.session)?.is_some())
    }

    fn artefact_path(&self, source: &Path) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav");
        self.scratch_dir
            .join(format!("recording-{}-{n}.{ext}", std::process::id()))
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, RecallError> {
    m.lock()
        .map_err(|_| RecallError::Internal("recorder state poisoned".to_string()))
}

#[async_trait]
impl PluginAdapter for ClipRecorder {
    fn name(&self) -> &str {
        "clip-recorder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Recorder
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        self.cancel().await
    }
}

#[async_trait]
impl AudioRecorder for ClipRecorder {
    async fn start(&self) -> Result<(), RecallError> {
        let mut session = lock(&self.session)?;
        if session.is_some() {
            return Err(RecallError::Validation(
                "a recording session is already active".to_string(),
            ));
        }
        let source = lock(&self.pending)?
            .take()
            .ok_or_else(|| RecallError::Validation("no audio clip loaded".to_string()))?;
        debug!(clip = %source.display(), "recording started");
        *session = Some(source);
        Ok(())
    }

    async fn stop(&self) -> Result<Option<AudioHandle>, RecallError> {
        let active = lock(&self.session)?.take();
        let Some(source) = active else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| RecallError::Internal(format!("failed to create scratch dir: {e}")))?;
        let dest = self.artefact_path(&source);
        if let Err(e) = tokio::fs::copy(&source, &dest).await {
            if let Err(rm) = tokio::fs::remove_file(&dest).await
                && rm.kind() != std::io::ErrorKind::NotFound
            {
                warn!(artefact = %dest.display(), error = %rm, "failed to remove partial recording");
            }
            return Err(RecallError::Validation(format!(
                "cannot record {}: {e}",
                source.display()
            )));
        }
        debug!(artefact = %dest.display(), "recording stopped");
        Ok(Some(AudioHandle::new(dest)))
    }

    async fn cancel(&self) -> Result<(), RecallError> {
        if lock(&self.session)?.take().is_some() {
            debug!("recording cancelled");
        }
        Ok(())
    }
}
