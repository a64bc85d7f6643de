// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory store trait implemented by every persistence backend.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MemoryFields, MemoryRecord};

/// Persistence for memory records.
///
/// Listing operations return records ordered by `created_at` descending,
/// ties broken by `id` descending.
#[async_trait]
pub trait MemoryBackend: PluginAdapter {
    /// Inserts a record and returns its store-assigned id.
    async fn add(&self, fields: MemoryFields) -> Result<i64, RecallError>;

    /// Fetches a single record.
    async fn get(&self, id: i64) -> Result<Option<MemoryRecord>, RecallError>;

    /// Replaces every mutable field, embedding included.
    ///
    /// Returns [`RecallError::NotFound`] if `id` does not exist.
    async fn update(&self, id: i64, fields: MemoryFields) -> Result<(), RecallError>;

    /// Sets only the embedding.
    ///
    /// Returns [`RecallError::NotFound`] if `id` does not exist.
    async fn update_embedding(&self, id: i64, embedding: Vec<f32>) -> Result<(), RecallError>;

    /// All records, newest first.
    async fn get_all(&self) -> Result<Vec<MemoryRecord>, RecallError>;

    /// Records with a readable embedding, newest first.
    async fn get_with_embeddings(&self) -> Result<Vec<MemoryRecord>, RecallError>;

    /// Case-insensitive substring match on item name, location, or notes.
    async fn text_search(&self, needle: &str) -> Result<Vec<MemoryRecord>, RecallError>;

    /// Removes a record. Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), RecallError>;

    /// Removes every record.
    async fn clear_all(&self) -> Result<(), RecallError>;

    /// Flushes pending writes and releases the medium.
    async fn close(&self) -> Result<(), RecallError>;
}
