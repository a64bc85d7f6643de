// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Recall.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Recall configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Memory store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Query and ranking settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Embedding runtime settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Answer generation runtime settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Speech-to-text settings.
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Application-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for downloaded models and scratch audio.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("recall"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> String {
    data_root().to_string_lossy().into_owned()
}

/// Which memory store variant to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite when the medium is usable, otherwise the key-value store.
    #[default]
    Auto,
    /// SQLite only.
    Sqlite,
    /// JSON document store only.
    KeyValue,
}

/// Memory store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend selection policy.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Path to the JSON document used by the key-value store.
    #[serde(default = "default_kv_path")]
    pub kv_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            kv_path: default_kv_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    data_root()
        .join("memories.db")
        .to_string_lossy()
        .into_owned()
}

fn default_kv_path() -> String {
    data_root()
        .join("memories.json")
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// How a query is answered by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Embedding similarity plus a generated answer.
    #[default]
    Semantic,
    /// Plain substring search.
    Text,
}

/// Query and ranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Default search mode.
    #[serde(default)]
    pub mode: SearchMode,

    /// Maximum number of ranked results.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Results must score strictly above this cosine similarity.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// When false, `similarity_threshold` is ignored and every scored
    /// result is kept.
    #[serde(default = "default_apply_threshold")]
    pub apply_threshold: bool,

    /// Number of top results given to the answer generator as context.
    #[serde(default = "default_context_results")]
    pub context_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            apply_threshold: default_apply_threshold(),
            context_results: default_context_results(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

impl SearchConfig {
    /// The threshold the ranker should apply, if any.
    pub fn effective_threshold(&self) -> Option<f32> {
        self.apply_threshold.then_some(self.similarity_threshold as f32)
    }
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_apply_threshold() -> bool {
    true
}

fn default_context_results() -> usize {
    3
}

/// Embedding runtime configuration (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// When false, no embeddings are computed and queries use text search.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the local model runtime.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Answer generation configuration (OpenAI-compatible `/chat/completions`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// When false, semantic queries return ranked results without an answer.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the local model runtime.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model name.
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            model: default_completion_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

/// Speech-to-text configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// When false, voice input is rejected.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the transcription runtime (`/audio/transcriptions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Speech model name.
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Where the speech model weights are downloaded from on first use.
    #[serde(default = "default_speech_model_url")]
    pub model_url: String,

    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            model: default_speech_model(),
            model_url: default_speech_model_url(),
            api_key: None,
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434/v1".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_completion_model() -> String {
    "qwen3:0.6b".to_string()
}

fn default_speech_model() -> String {
    "whisper-small".to_string()
}

fn default_speech_model_url() -> String {
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_completion_timeout_secs() -> u64 {
    120
}
