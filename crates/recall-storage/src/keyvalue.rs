// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value fallback store: the whole collection as one JSON document.
//!
//! Used where SQLite cannot be opened. Every mutation rewrites the document
//! atomically (write to a sibling temp file, then rename), so a crash never
//! leaves a half-written collection behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use recall_core::{
    AdapterType, HealthStatus, MemoryBackend, MemoryFields, MemoryRecord, PluginAdapter,
    RecallError,
};

use crate::models::{advance_timestamp, decode_embedding, encode_embedding, now_micros};

/// On-disk shape of the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    /// Next id to hand out. Survives `clear_all` so ids are never reused.
    next_id: i64,
    memories: Vec<StoredMemory>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            next_id: 1,
            memories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMemory {
    id: i64,
    item_name: String,
    location: String,
    #[serde(default)]
    notes: Option<String>,
    /// JSON array text, same encoding as the SQLite column.
    #[serde(default)]
    embedding: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredMemory {
    fn to_record(&self) -> MemoryRecord {
        MemoryRecord {
            id: self.id,
            item_name: self.item_name.clone(),
            location: self.location.clone(),
            notes: self.notes.clone(),
            embedding: decode_embedding(self.id, self.embedding.as_deref()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.item_name.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
    }
}

/// Memory store over a single JSON document, on disk or purely in memory.
pub struct KeyValueMemoryStore {
    path: Option<PathBuf>,
    doc: Mutex<Document>,
}

impl KeyValueMemoryStore {
    /// Opens the document at `path`, creating an empty one if absent.
    ///
    /// An unreadable or unwritable location is
    /// [`RecallError::StorageUnavailable`]; a document that exists but
    /// cannot be parsed is a [`RecallError::Storage`] error and is left
    /// untouched.
    pub async fn open(path: &Path) -> Result<Self, RecallError> {
        let doc = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<Document>(&bytes).map_err(RecallError::storage)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = Document::default();
                write_document(path, &doc)
                    .await
                    .map_err(|e| RecallError::StorageUnavailable {
                        reason: format!("cannot create {}: {e}", path.display()),
                    })?;
                doc
            }
            Err(e) => {
                return Err(RecallError::StorageUnavailable {
                    reason: format!("cannot read {}: {e}", path.display()),
                });
            }
        };
        info!(path = %path.display(), count = doc.memories.len(), "key-value memory store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            doc: Mutex::new(doc),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            doc: Mutex::new(Document::default()),
        }
    }

    /// Persists `next` and, only on success, makes it the live document.
    async fn commit(&self, live: &mut Document, next: Document) -> Result<(), RecallError> {
        if let Some(path) = &self.path {
            write_document(path, &next).await?;
        }
        *live = next;
        Ok(())
    }

    async fn records_where(
        &self,
        keep: impl Fn(&StoredMemory) -> bool,
    ) -> Vec<MemoryRecord> {
        let doc = self.doc.lock().await;
        let mut records: Vec<MemoryRecord> = doc
            .memories
            .iter()
            .filter(|m| keep(*m))
            .map(StoredMemory::to_record)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    async fn modify(
        &self,
        id: i64,
        apply: impl FnOnce(&mut StoredMemory),
    ) -> Result<(), RecallError> {
        let mut live = self.doc.lock().await;
        let mut next = live.clone();
        let memory = next
            .memories
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RecallError::NotFound { id })?;
        apply(memory);
        memory.updated_at = advance_timestamp(memory.updated_at);
        self.commit(&mut live, next).await
    }
}

async fn write_document(path: &Path, doc: &Document) -> Result<(), RecallError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(RecallError::storage)?;
    }
    let bytes = serde_json::to_vec_pretty(doc).map_err(RecallError::storage)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(RecallError::storage)?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(RecallError::storage)?;
    Ok(())
}

#[async_trait]
impl PluginAdapter for KeyValueMemoryStore {
    fn name(&self) -> &str {
        "key_value"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        match &self.path {
            Some(path) if !path.exists() => Ok(HealthStatus::Degraded(format!(
                "{} is missing; it will be recreated on the next write",
                path.display()
            ))),
            _ => Ok(HealthStatus::Healthy),
        }
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl MemoryBackend for KeyValueMemoryStore {
    async fn add(&self, fields: MemoryFields) -> Result<i64, RecallError> {
        let fields = fields.normalized()?;
        let embedding = fields.embedding.as_deref().map(encode_embedding).transpose()?;
        let now = now_micros();

        let mut live = self.doc.lock().await;
        let mut next = live.clone();
        let id = next.next_id;
        next.next_id += 1;
        next.memories.push(StoredMemory {
            id,
            item_name: fields.item_name,
            location: fields.location,
            notes: fields.notes,
            embedding,
            created_at: now,
            updated_at: now,
        });
        self.commit(&mut live, next).await?;
        debug!(id, "memory added");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<MemoryRecord>, RecallError> {
        let doc = self.doc.lock().await;
        Ok(doc
            .memories
            .iter()
            .find(|m| m.id == id)
            .map(StoredMemory::to_record))
    }

    async fn update(&self, id: i64, fields: MemoryFields) -> Result<(), RecallError> {
        let fields = fields.normalized()?;
        let embedding = fields.embedding.as_deref().map(encode_embedding).transpose()?;
        self.modify(id, move |m| {
            m.item_name = fields.item_name;
            m.location = fields.location;
            m.notes = fields.notes;
            m.embedding = embedding;
        })
        .await?;
        debug!(id, "memory updated");
        Ok(())
    }

    async fn update_embedding(&self, id: i64, embedding: Vec<f32>) -> Result<(), RecallError> {
        let encoded = encode_embedding(&embedding)?;
        self.modify(id, move |m| m.embedding = Some(encoded)).await?;
        debug!(id, dimensions = embedding.len(), "embedding stored");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<MemoryRecord>, RecallError> {
        Ok(self.records_where(|_| true).await)
    }

    async fn get_with_embeddings(&self) -> Result<Vec<MemoryRecord>, RecallError> {
        let records = self.records_where(|m| m.embedding.is_some()).await;
        Ok(records.into_iter().filter(MemoryRecord::has_embedding).collect())
    }

    async fn text_search(&self, needle: &str) -> Result<Vec<MemoryRecord>, RecallError> {
        let needle = needle.to_lowercase();
        Ok(self.records_where(|m| m.matches(&needle)).await)
    }

    async fn delete(&self, id: i64) -> Result<(), RecallError> {
        let mut live = self.doc.lock().await;
        if !live.memories.iter().any(|m| m.id == id) {
            return Ok(());
        }
        let mut next = live.clone();
        next.memories.retain(|m| m.id != id);
        self.commit(&mut live, next).await?;
        debug!(id, "memory deleted");
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RecallError> {
        let mut live = self.doc.lock().await;
        let next = Document {
            next_id: live.next_id,
            memories: Vec::new(),
        };
        self.commit(&mut live, next).await?;
        debug!("all memories cleared");
        Ok(())
    }

    async fn close(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn ordering_and_ids_match_sql_store() {
        let store = KeyValueMemoryStore::in_memory();
        let a = store.add(MemoryFields::new("Passport", "Blue bag")).await.unwrap();
        let b = store.add(MemoryFields::new("Keys", "Hook")).await.unwrap();
        assert_eq!((a, b), (1, 2));

        let ids: Vec<i64> = store.get_all().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn next_id_survives_clear_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memories.json");
        {
            let store = KeyValueMemoryStore::open(&path).await.unwrap();
            store.add(MemoryFields::new("Passport", "Blue bag")).await.unwrap();
            store.add(MemoryFields::new("Keys", "Hook")).await.unwrap();
            store.clear_all().await.unwrap();
        }
        let store = KeyValueMemoryStore::open(&path).await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.add(MemoryFields::new("Wallet", "Coat")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn mutations_are_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memories.json");
        let id = {
            let store = KeyValueMemoryStore::open(&path).await.unwrap();
            let id = store.add(MemoryFields::new("Passport", "Blue bag")).await.unwrap();
            store.update_embedding(id, vec![1.0, 0.0, 0.0]).await.unwrap();
            id
        };
        let store = KeyValueMemoryStore::open(&path).await.unwrap();
        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.embedding, Some(vec![1.0, 0.0, 0.0]));
        assert!(!dir.path().join("memories.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error_and_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memories.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = KeyValueMemoryStore::open(&path).await.err().unwrap();
        assert!(matches!(err, RecallError::Storage { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
    }

    #[tokio::test]
    async fn update_missing_is_not_found_and_delete_is_idempotent() {
        let store = KeyValueMemoryStore::in_memory();
        let err = store
            .update(5, MemoryFields::new("Keys", "Hook"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::NotFound { id: 5 }));
        store.delete(5).await.unwrap();
        store.delete(5).await.unwrap();
    }

    #[tokio::test]
    async fn update_advances_updated_at() {
        let store = KeyValueMemoryStore::in_memory();
        let id = store.add(MemoryFields::new("Keys", "Hook")).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap();
        store
            .update(id, MemoryFields::new("Keys", "Bowl").with_notes("car keys"))
            .await
            .unwrap();
        let after = store.get(id).await.unwrap().unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.location, "Bowl");
    }

    #[tokio::test]
    async fn text_search_matches_notes_case_insensitively() {
        let store = KeyValueMemoryStore::in_memory();
        store.add(MemoryFields::new("Passport", "Blue bag")).await.unwrap();
        store
            .add(MemoryFields::new("Charger", "Desk").with_notes("ÜBER cable"))
            .await
            .unwrap();
        assert_eq!(store.text_search("BAG").await.unwrap().len(), 1);
        assert_eq!(store.text_search("über").await.unwrap().len(), 1);
        assert!(store.text_search("garage").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_stored_embedding_reads_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memories.json");
        let doc = r#"{
            "next_id": 2,
            "memories": [{
                "id": 1, "item_name": "Keys", "location": "Hook",
                "embedding": "[0.1, nope]",
                "created_at": "2026-03-01T00:00:00.000000Z",
                "updated_at": "2026-03-01T00:00:00.000000Z"
            }]
        }"#;
        std::fs::write(&path, doc).unwrap();

        let store = KeyValueMemoryStore::open(&path).await.unwrap();
        assert!(store.get_with_embeddings().await.unwrap().is_empty());
        assert_eq!(store.get(1).await.unwrap().unwrap().embedding, None);
    }
}
