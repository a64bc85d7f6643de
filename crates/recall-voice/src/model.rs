// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-time speech model download.
//!
//! The model file is streamed to `<name>.bin.part` and renamed into place
//! once complete, so a present model file is always whole. Progress is
//! published on a `watch` channel.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use recall_config::model::{AppConfig, SpeechConfig};
use recall_core::{Capability, RecallError};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Download lifecycle of the speech model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelStatus {
    /// The model file is present on disk.
    pub downloaded: bool,
    /// A download is in progress.
    pub downloading: bool,
    /// Fraction in `[0, 1]`. Stays at `0` when the size is unknown.
    pub progress: f32,
    /// The model can be used for transcription.
    pub ready: bool,
}

impl ModelStatus {
    fn present() -> Self {
        Self {
            downloaded: true,
            downloading: false,
            progress: 1.0,
            ready: true,
        }
    }
}

/// Removes the partial file and resets the status unless settled.
///
/// Covers failed downloads and download futures dropped mid-transfer.
struct PendingDownload<'a> {
    status: &'a watch::Sender<ModelStatus>,
    part: &'a Path,
    settled: bool,
}

impl PendingDownload<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingDownload<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match std::fs::remove_file(self.part) {
            Ok(()) => debug!(path = %self.part.display(), "partial speech model removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, "failed to remove partial speech model"),
        }
        self.status.send_replace(ModelStatus::default());
    }
}

/// Manages download and path resolution for the speech model.
pub struct SpeechModelManager {
    model_path: PathBuf,
    url: String,
    http: reqwest::Client,
    status: watch::Sender<ModelStatus>,
    /// Serializes concurrent downloads.
    download_lock: Mutex<()>,
}

impl SpeechModelManager {
    pub fn new(data_dir: &Path, model: &str, url: impl Into<String>) -> Self {
        let model_path = data_dir
            .join("models")
            .join("speech")
            .join(format!("{model}.bin"));
        let initial = if model_path.is_file() {
            ModelStatus::present()
        } else {
            ModelStatus::default()
        };
        let (status, _) = watch::channel(initial);
        Self {
            model_path,
            url: url.into(),
            http: reqwest::Client::new(),
            status,
            download_lock: Mutex::new(()),
        }
    }

    pub fn from_config(app: &AppConfig, speech: &SpeechConfig) -> Self {
        Self::new(&app.data_dir_path(), &speech.model, speech.model_url.clone())
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn part_path(&self) -> PathBuf {
        let mut name = OsString::from(self.model_path.as_os_str());
        name.push(".part");
        PathBuf::from(name)
    }

    pub fn status(&self) -> ModelStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModelStatus> {
        self.status.subscribe()
    }

    /// Fails with `CapabilityUnavailable` unless the model is ready.
    pub fn ensure_ready(&self) -> Result<(), RecallError> {
        let status = self.status();
        if status.ready {
            Ok(())
        } else if status.downloading {
            Err(RecallError::unavailable(
                Capability::Transcription,
                "speech model is still downloading",
            ))
        } else {
            Err(RecallError::unavailable(
                Capability::Transcription,
                "speech model has not been downloaded",
            ))
        }
    }

    /// Downloads the model if it is not already present.
    ///
    /// Concurrent callers wait for the first download and then see the model
    /// as present. A failed download leaves no partial file behind.
    pub async fn download(&self) -> Result<PathBuf, RecallError> {
        let _guard = self.download_lock.lock().await;

        if self.model_path.is_file() {
            self.status.send_replace(ModelStatus::present());
            return Ok(self.model_path.clone());
        }

        info!(url = %self.url, "downloading speech model");
        self.status.send_replace(ModelStatus {
            downloading: true,
            ..ModelStatus::default()
        });

        let part = self.part_path();
        let pending = PendingDownload {
            status: &self.status,
            part: &part,
            settled: false,
        };
        let size = self.fetch(&part).await?;
        tokio::fs::rename(&part, &self.model_path)
            .await
            .map_err(|e| {
                RecallError::Internal(format!("failed to move speech model into place: {e}"))
            })?;
        pending.settle();

        info!(bytes = size, path = %self.model_path.display(), "speech model ready");
        self.status.send_replace(ModelStatus::present());
        Ok(self.model_path.clone())
    }

    async fn fetch(&self, part: &Path) -> Result<u64, RecallError> {
        if let Some(dir) = part.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                RecallError::Internal(format!("failed to create model directory: {e}"))
            })?;
        }

        let mut response = self.http.get(&self.url).send().await.map_err(|e| {
            RecallError::Provider {
                message: format!("failed to download {}: {e}", self.url),
                source: Some(Box::new(e)),
            }
        })?;
        if !response.status().is_success() {
            return Err(RecallError::Provider {
                message: format!("download failed with status {}: {}", response.status(), self.url),
                source: None,
            });
        }

        let total = response.content_length().filter(|n| *n > 0);
        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| RecallError::Internal(format!("failed to create {}: {e}", part.display())))?;

        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| RecallError::Provider {
            message: format!("download interrupted: {e}"),
            source: Some(Box::new(e)),
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|e| RecallError::Internal(format!("failed to write model: {e}")))?;
            received += chunk.len() as u64;
            if let Some(total) = total {
                let progress = (received as f64 / total as f64).min(1.0) as f32;
                self.status.send_modify(|s| s.progress = progress);
                debug!(received, total, "speech model download progress");
            }
        }
        file.flush()
            .await
            .map_err(|e| RecallError::Internal(format!("failed to flush model: {e}")))?;
        Ok(received)
    }
}
