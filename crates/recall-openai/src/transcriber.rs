// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech-to-text via multipart `POST /audio/transcriptions`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use recall_config::SpeechConfig;
use recall_core::{
    AdapterType, AudioHandle, Capability, HealthStatus, PluginAdapter, RecallError,
    TranscriptionAdapter,
};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::TranscriptionResponse;

pub struct OpenAiTranscriber {
    client: OpenAiClient,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Result<Self, RecallError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
            Capability::Transcription,
        )?;
        info!(model = %config.model, base_url = %config.base_url, "transcription adapter initialized");
        Ok(Self::new(client, config.model.clone()))
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl PluginAdapter for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai-transcription"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transcription
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(self.client.probe().await)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        debug!("transcription adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl TranscriptionAdapter for OpenAiTranscriber {
    async fn transcribe(&self, handle: &AudioHandle) -> Result<String, RecallError> {
        let bytes = tokio::fs::read(&handle.path).await.map_err(|e| {
            RecallError::Validation(format!(
                "cannot read recording {}: {e}",
                handle.path.display()
            ))
        })?;
        let file_name = handle
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());
        debug!(file = %file_name, bytes = bytes.len(), "uploading recording");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(&handle.path))
            .map_err(|e| RecallError::Internal(format!("invalid audio mime type: {e}")))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        let response: TranscriptionResponse = self
            .client
            .post_multipart("audio/transcriptions", form)
            .await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcriber(base: &str) -> OpenAiTranscriber {
        let client =
            OpenAiClient::new(base, None, Duration::from_secs(5), Capability::Transcription)
                .unwrap();
        OpenAiTranscriber::new(client, "whisper-small")
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a.WAV")), "audio/wav");
        assert_eq!(mime_for(Path::new("a.m4a")), "audio/mp4");
        assert_eq!(mime_for(Path::new("a")), "application/octet-stream");
    }

    #[tokio::test]
    async fn uploads_file_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(body_string_contains("whisper-small"))
            .and(body_string_contains("clip.wav"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"text": "passport in the blue bag"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        std::fs::write(&clip, b"RIFF0000WAVE").unwrap();

        let text = transcriber(&server.uri())
            .transcribe(&AudioHandle::new(&clip))
            .await
            .unwrap();
        assert_eq!(text, "passport in the blue bag");
        assert!(clip.exists(), "transcriber must not delete the recording");
    }

    #[tokio::test]
    async fn missing_recording_is_validation_error() {
        let err = transcriber("http://127.0.0.1:1")
            .transcribe(&AudioHandle::new("/nonexistent/clip.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::Validation(_)));
    }
}
