// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter for deterministic testing.
//!
//! `MockEmbedder` returns pinned vectors for known texts and a
//! letter-frequency vector for anything else, so identical texts always
//! score 1.0 against each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recall_core::types::{EmbeddingInput, EmbeddingOutput};
use recall_core::{
    AdapterType, Capability, EmbeddingAdapter, HealthStatus, PluginAdapter, RecallError,
};

/// Letter-frequency vector over `a..=z`.
pub fn letter_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; 26];
    for b in text.to_ascii_lowercase().bytes() {
        if b.is_ascii_lowercase() {
            v[usize::from(b - b'a')] += 1.0;
        }
    }
    v
}

pub struct MockEmbedder {
    pinned: Mutex<HashMap<String, Vec<f32>>>,
    available: AtomicBool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            pinned: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            calls: Arc::default(),
        }
    }

    /// An embedder whose model is not loaded yet.
    pub fn unavailable() -> Self {
        let e = Self::new();
        e.set_available(false);
        e
    }

    /// Returns `vector` whenever exactly `text` is embedded.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.pin(text, vector);
        self
    }

    pub fn pin(&self, text: impl Into<String>, vector: Vec<f32>) {
        if let Ok(mut pinned) = self.pinned.lock() {
            pinned.insert(text.into(), vector);
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every text embedded so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RecallError::unavailable(
                Capability::Embedding,
                "mock model not loaded",
            ));
        }
        let pinned = self
            .pinned
            .lock()
            .map_err(|_| RecallError::Internal("mock embedder poisoned".into()))?;
        let embeddings: Vec<Vec<f32>> = input
            .texts
            .iter()
            .map(|t| pinned.get(t).cloned().unwrap_or_else(|| letter_vector(t)))
            .collect();
        drop(pinned);

        if let Ok(mut calls) = self.calls.lock() {
            calls.extend(input.texts);
        }
        let dimensions = embeddings.first().map_or(0, Vec::len);
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pinned_vectors_win() {
        let e = MockEmbedder::new().with_vector("passport", vec![1.0, 0.0, 0.0]);
        let out = e.embed(EmbeddingInput::single("passport")).await.unwrap();
        assert_eq!(out.embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(out.dimensions, 3);

        let out = e.embed(EmbeddingInput::single("keys")).await.unwrap();
        assert_eq!(out.dimensions, 26);
        assert_eq!(e.calls(), vec!["passport", "keys"]);
    }

    #[tokio::test]
    async fn unavailable_until_enabled() {
        let e = MockEmbedder::unavailable();
        let err = e.embed(EmbeddingInput::single("x")).await.unwrap_err();
        assert!(err.is_capability_unavailable());
        e.set_available(true);
        assert!(e.embed(EmbeddingInput::single("x")).await.is_ok());
    }
}
