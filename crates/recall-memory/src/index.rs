// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps stored memories paired with embeddings of their text.
//!
//! The embedding capability is optional. When it is missing or not ready,
//! records are stored without an embedding and can be filled in later with
//! [`EmbeddingIndex::reindex`].

use std::sync::Arc;

use recall_core::types::EmbeddingInput;
use recall_core::{Capability, EmbeddingAdapter, MemoryBackend, MemoryFields, RecallError};
use tracing::{debug, info, warn};

use crate::types::embedding_text;

/// Counts from a [`EmbeddingIndex::reindex`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    pub embedded: usize,
    pub skipped: usize,
}

pub struct EmbeddingIndex {
    store: Arc<dyn MemoryBackend>,
    embedder: Option<Arc<dyn EmbeddingAdapter>>,
}

impl EmbeddingIndex {
    pub fn new(store: Arc<dyn MemoryBackend>, embedder: Option<Arc<dyn EmbeddingAdapter>>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &Arc<dyn MemoryBackend> {
        &self.store
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Embeds a single text.
    ///
    /// Returns [`RecallError::CapabilityUnavailable`] when no embedder is
    /// configured or the embedder reports it is not ready.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| RecallError::unavailable(Capability::Embedding, "no embedder configured"))?;
        let output = embedder.embed(EmbeddingInput::single(text)).await?;
        output
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RecallError::Provider {
                message: "embedding runtime returned no vector".to_string(),
                source: None,
            })
    }

    /// Embedding for `fields`, or `None` if it cannot be computed right now.
    async fn embedding_for(&self, fields: &MemoryFields) -> Option<Vec<f32>> {
        let text = embedding_text(&fields.item_name, &fields.location, fields.notes.as_deref());
        match self.embed_text(&text).await {
            Ok(vector) => Some(vector),
            Err(e) if e.is_capability_unavailable() => {
                debug!(error = %e, "storing memory without embedding");
                None
            }
            Err(e) => {
                warn!(error = %e, "embedding failed, storing memory without embedding");
                None
            }
        }
    }

    /// Adds a memory, then computes and stores its embedding.
    ///
    /// The record is kept even when the embedding cannot be computed.
    pub async fn remember(&self, fields: MemoryFields) -> Result<i64, RecallError> {
        let fields = MemoryFields {
            embedding: None,
            ..fields.normalized()?
        };
        let id = self.store.add(fields.clone()).await?;
        if let Some(vector) = self.embedding_for(&fields).await {
            self.store.update_embedding(id, vector).await?;
        }
        Ok(id)
    }

    /// Replaces a memory's fields and recomputes its embedding.
    pub async fn revise(&self, id: i64, fields: MemoryFields) -> Result<(), RecallError> {
        let mut fields = fields.normalized()?;
        if self.store.get(id).await?.is_none() {
            return Err(RecallError::NotFound { id });
        }
        fields.embedding = self.embedding_for(&fields).await;
        self.store.update(id, fields).await
    }

    /// Embeds every stored memory that has no embedding yet.
    ///
    /// Stops early if the capability turns out to be unavailable; remaining
    /// records are counted as skipped.
    pub async fn reindex(&self) -> Result<ReindexReport, RecallError> {
        let pending: Vec<_> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter(|m| !m.has_embedding())
            .collect();

        let mut report = ReindexReport::default();
        let mut remaining = pending.len();
        for memory in pending {
            let text = embedding_text(&memory.item_name, &memory.location, memory.notes.as_deref());
            match self.embed_text(&text).await {
                Ok(vector) => {
                    self.store.update_embedding(memory.id, vector).await?;
                    report.embedded += 1;
                }
                Err(e) if e.is_capability_unavailable() => {
                    info!(error = %e, remaining, "embedding unavailable, reindex stopped");
                    report.skipped += remaining;
                    break;
                }
                Err(e) => {
                    warn!(id = memory.id, error = %e, "could not embed memory");
                    report.skipped += 1;
                }
            }
            remaining -= 1;
        }
        info!(embedded = report.embedded, skipped = report.skipped, "reindex finished");
        Ok(report)
    }
}
