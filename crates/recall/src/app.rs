// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root.
//!
//! Builds the store, model adapters, embedding index, query orchestrator,
//! and voice input once per process, and tears them down on exit.

use std::path::Path;
use std::sync::Arc;

use recall_config::RecallConfig;
use recall_core::{
    AudioRecorder, CompletionAdapter, EmbeddingAdapter, MemoryBackend, PluginAdapter,
    RecallError, TranscriptionAdapter,
};
use recall_memory::{EmbeddingIndex, QueryOrchestrator};
use recall_openai::{OpenAiCompleter, OpenAiEmbedder, OpenAiTranscriber};
use recall_storage::open_backend;
use recall_voice::{ClipRecorder, SpeechModelManager, VoiceInput};
use tracing::{debug, info, warn};

pub struct App {
    pub config: RecallConfig,
    pub store: Arc<dyn MemoryBackend>,
    pub index: Arc<EmbeddingIndex>,
    pub orchestrator: QueryOrchestrator,
    pub speech: Arc<SpeechModelManager>,
    recorder: Arc<ClipRecorder>,
    voice: Option<VoiceInput>,
    adapters: Vec<Arc<dyn PluginAdapter>>,
}

/// Builds an optional adapter, logging and dropping it if construction fails.
fn optional<T>(enabled: bool, what: &str, build: impl FnOnce() -> Result<T, RecallError>) -> Option<T> {
    if !enabled {
        info!("{what} disabled by configuration");
        return None;
    }
    match build() {
        Ok(adapter) => Some(adapter),
        Err(e) => {
            warn!(error = %e, "{what} unavailable, continuing without it");
            None
        }
    }
}

impl App {
    pub async fn build(config: RecallConfig) -> Result<Self, RecallError> {
        let store = open_backend(&config.storage).await?;

        let embedder = optional(config.embedding.enabled, "embedding", || {
            OpenAiEmbedder::from_config(&config.embedding)
        })
        .map(Arc::new);
        let completer = optional(config.completion.enabled, "answer generation", || {
            OpenAiCompleter::from_config(&config.completion)
        })
        .map(Arc::new);
        let transcriber = optional(config.speech.enabled, "speech-to-text", || {
            OpenAiTranscriber::from_config(&config.speech)
        })
        .map(Arc::new);

        let mut adapters: Vec<Arc<dyn PluginAdapter>> = Vec::new();
        if let Some(e) = &embedder {
            adapters.push(e.clone());
        }
        if let Some(c) = &completer {
            adapters.push(c.clone());
        }
        if let Some(t) = &transcriber {
            adapters.push(t.clone());
        }

        let index = Arc::new(EmbeddingIndex::new(
            store.clone(),
            embedder.map(|e| e as Arc<dyn EmbeddingAdapter>),
        ));
        let orchestrator = QueryOrchestrator::from_config(
            index.clone(),
            completer.map(|c| c as Arc<dyn CompletionAdapter>),
            &config.search,
            &config.completion,
        );

        let data_dir = config.app.data_dir_path();
        let speech = Arc::new(SpeechModelManager::from_config(&config.app, &config.speech));
        let recorder = Arc::new(ClipRecorder::new(data_dir.join("scratch")));
        adapters.push(recorder.clone());
        let voice = config.speech.enabled.then(|| {
            VoiceInput::new(
                recorder.clone() as Arc<dyn AudioRecorder>,
                transcriber.map(|t| t as Arc<dyn TranscriptionAdapter>),
                speech.clone(),
            )
        });

        Ok(Self {
            config,
            store,
            index,
            orchestrator,
            speech,
            recorder,
            voice,
            adapters,
        })
    }

    /// Transcribes an audio clip through the voice pipeline.
    ///
    /// Returns `None` for a blank transcript.
    pub async fn transcribe_clip(&self, clip: &Path) -> Result<Option<String>, RecallError> {
        let voice = self.voice.as_ref().ok_or_else(|| {
            RecallError::Validation("voice input is disabled (speech.enabled = false)".to_string())
        })?;
        self.recorder.load(clip)?;
        if let Err(e) = voice.start_recording().await {
            self.recorder.unload()?;
            return Err(e);
        }
        voice.stop_and_transcribe().await
    }

    /// Shuts adapters down and closes the store.
    pub async fn shutdown(self) -> Result<(), RecallError> {
        for adapter in &self.adapters {
            if let Err(e) = adapter.shutdown().await {
                warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
            }
        }
        self.store.close().await?;
        debug!("application shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_config::StorageBackend;
    use recall_core::MemoryFields;
    use recall_memory::QueryMode;

    fn offline_config(dir: &Path) -> RecallConfig {
        let mut config = RecallConfig::default();
        config.app.data_dir = dir.to_string_lossy().into_owned();
        config.storage.backend = StorageBackend::KeyValue;
        config.storage.kv_path = dir.join("memories.json").to_string_lossy().into_owned();
        config.embedding.enabled = false;
        config.completion.enabled = false;
        config.speech.enabled = false;
        config
    }

    #[tokio::test]
    async fn offline_app_falls_back_to_text_search() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::build(offline_config(dir.path())).await.unwrap();
        assert_eq!(app.store.name(), "key_value");

        app.index
            .remember(MemoryFields::new("Passport", "Blue bag"))
            .await
            .unwrap();
        let outcome = app.orchestrator.ask("bag").await;
        assert_eq!(outcome.mode, QueryMode::Text);
        assert_eq!(outcome.hits.len(), 1);

        app.shutdown().await.unwrap();
        assert!(dir.path().join("memories.json").exists());
    }

    #[tokio::test]
    async fn busy_voice_input_does_not_keep_the_clip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(dir.path());
        config.speech.enabled = true;
        let app = App::build(config).await.unwrap();
        let voice = app.voice.as_ref().unwrap();

        let first = dir.path().join("first.wav");
        let second = dir.path().join("second.wav");
        std::fs::write(&first, b"RIFF").unwrap();
        std::fs::write(&second, b"RIFF").unwrap();
        app.recorder.load(&first).unwrap();
        voice.start_recording().await.unwrap();

        let err = app.transcribe_clip(&second).await.unwrap_err();
        assert!(matches!(err, RecallError::Validation(_)));

        voice.cancel_recording().await.unwrap();
        assert!(matches!(
            app.recorder.start().await,
            Err(RecallError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn voice_disabled_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::build(offline_config(dir.path())).await.unwrap();
        let err = app.transcribe_clip(&dir.path().join("x.wav")).await.unwrap_err();
        assert!(matches!(err, RecallError::Validation(_)));
    }
}
