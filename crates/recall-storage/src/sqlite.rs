// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MemoryBackend trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use recall_core::{
    AdapterType, HealthStatus, MemoryBackend, MemoryFields, MemoryRecord, PluginAdapter,
    RecallError,
};

use crate::database::{Database, map_tr_err};
use crate::models::{
    advance_timestamp, decode_embedding, encode_embedding, format_timestamp, now_micros,
    parse_timestamp,
};

const COLUMNS: &str = "id, item_name, location, notes, embedding, created_at, updated_at";
const ORDER: &str = "ORDER BY created_at DESC, id DESC";

/// SQL-table-backed memory store.
///
/// Each mutation is a single statement (or a single transaction for
/// read-modify-write), executed on the database's writer thread.
pub struct SqliteMemoryStore {
    db: Database,
}

impl SqliteMemoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at `path` and wraps it.
    pub async fn open(path: &std::path::Path, wal_mode: bool) -> Result<Self, RecallError> {
        Ok(Self::new(Database::open(path, wal_mode).await?))
    }

    /// A store over a private in-memory database.
    pub async fn in_memory() -> Result<Self, RecallError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn select(
        &self,
        filter: &'static str,
        param: Option<String>,
    ) -> Result<Vec<MemoryRecord>, RecallError> {
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<MemoryRecord>, rusqlite::Error> {
                let sql = format!("SELECT {COLUMNS} FROM memories {filter} {ORDER}");
                let mut stmt = conn.prepare(&sql)?;
                let rows = match &param {
                    Some(p) => stmt.query_map(params![p], row_to_record)?,
                    None => stmt.query_map([], row_to_record)?,
                };
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a row selected with [`COLUMNS`] into a record.
fn row_to_record(row: &Row<'_>) -> Result<MemoryRecord, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let embedding: Option<String> = row.get(4)?;
    Ok(MemoryRecord {
        id,
        item_name: row.get(1)?,
        location: row.get(2)?,
        notes: row.get(3)?,
        embedding: decode_embedding(id, embedding.as_deref()),
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> Result<chrono::DateTime<chrono::Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Computes the next `updated_at` for a stored value, tolerating bad text.
fn next_updated_at(previous: &str) -> String {
    let next = match parse_timestamp(previous) {
        Ok(prev) => advance_timestamp(prev),
        Err(_) => now_micros(),
    };
    format_timestamp(next)
}

#[async_trait]
impl PluginAdapter for SqliteMemoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        self.db.close().await
    }
}

#[async_trait]
impl MemoryBackend for SqliteMemoryStore {
    async fn add(&self, fields: MemoryFields) -> Result<i64, RecallError> {
        let fields = fields.normalized()?;
        let embedding = fields.embedding.as_deref().map(encode_embedding).transpose()?;
        let now = format_timestamp(now_micros());

        let id = self
            .db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO memories (item_name, location, notes, embedding, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![fields.item_name, fields.location, fields.notes, embedding, now],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(id, "memory added");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<MemoryRecord>, RecallError> {
        self.db
            .connection()
            .call(move |conn| -> Result<Option<MemoryRecord>, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM memories WHERE id = ?1"),
                    params![id],
                    row_to_record,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn update(&self, id: i64, fields: MemoryFields) -> Result<(), RecallError> {
        let fields = fields.normalized()?;
        let embedding = fields.embedding.as_deref().map(encode_embedding).transpose()?;

        let found = self
            .db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let tx = conn.transaction()?;
                let previous: Option<String> = tx
                    .query_row(
                        "SELECT updated_at FROM memories WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                let Some(previous) = previous else {
                    return Ok(false);
                };
                tx.execute(
                    "UPDATE memories
                     SET item_name = ?1, location = ?2, notes = ?3, embedding = ?4, updated_at = ?5
                     WHERE id = ?6",
                    params![
                        fields.item_name,
                        fields.location,
                        fields.notes,
                        embedding,
                        next_updated_at(&previous),
                        id
                    ],
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(map_tr_err)?;

        if !found {
            return Err(RecallError::NotFound { id });
        }
        debug!(id, "memory updated");
        Ok(())
    }

    async fn update_embedding(&self, id: i64, embedding: Vec<f32>) -> Result<(), RecallError> {
        let encoded = encode_embedding(&embedding)?;
        let found = self
            .db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let tx = conn.transaction()?;
                let previous: Option<String> = tx
                    .query_row(
                        "SELECT updated_at FROM memories WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                let Some(previous) = previous else {
                    return Ok(false);
                };
                tx.execute(
                    "UPDATE memories SET embedding = ?1, updated_at = ?2 WHERE id = ?3",
                    params![encoded, next_updated_at(&previous), id],
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(map_tr_err)?;

        if !found {
            return Err(RecallError::NotFound { id });
        }
        debug!(id, dimensions = embedding.len(), "embedding stored");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<MemoryRecord>, RecallError> {
        self.select("", None).await
    }

    async fn get_with_embeddings(&self) -> Result<Vec<MemoryRecord>, RecallError> {
        let records = self.select("WHERE embedding IS NOT NULL", None).await?;
        // Rows whose embedding failed to decode come back without one.
        Ok(records.into_iter().filter(MemoryRecord::has_embedding).collect())
    }

    async fn text_search(&self, needle: &str) -> Result<Vec<MemoryRecord>, RecallError> {
        if needle.is_empty() {
            return self.get_all().await;
        }
        // recall_lower is registered by Database; SQLite's lower() is ASCII-only.
        const FILTER: &str = "WHERE instr(recall_lower(item_name), ?1) > 0
               OR instr(recall_lower(location), ?1) > 0
               OR instr(recall_lower(coalesce(notes, '')), ?1) > 0";
        self.select(FILTER, Some(needle.to_lowercase())).await
    }

    async fn delete(&self, id: i64) -> Result<(), RecallError> {
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM memories WHERE id = ?1", params![id])
            })
            .await
            .map_err(map_tr_err)?;
        debug!(id, removed, "memory delete");
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RecallError> {
        let removed = self
            .db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM memories", [])
            })
            .await
            .map_err(map_tr_err)?;
        debug!(removed, "all memories cleared");
        Ok(())
    }

    async fn close(&self) -> Result<(), RecallError> {
        self.db.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn passport() -> MemoryFields {
        MemoryFields::new("Passport", "Blue bag")
    }

    #[tokio::test]
    async fn add_then_get_round_trips_fields() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let id = store
            .add(MemoryFields::new(" Keys ", "Hook by door").with_notes("spare set"))
            .await
            .unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.item_name, "Keys");
        assert_eq!(record.location, "Hook by door");
        assert_eq!(record.notes.as_deref(), Some("spare set"));
        assert_eq!(record.embedding, None);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn add_rejects_blank_location() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let err = store.add(MemoryFields::new("Keys", "  ")).await.unwrap_err();
        assert!(matches!(err, RecallError::Validation(_)));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_all_is_newest_first() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let first = store.add(passport()).await.unwrap();
        let second = store.add(MemoryFields::new("Charger", "Desk")).await.unwrap();

        let ids: Vec<i64> = store.get_all().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_clear() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let first = store.add(passport()).await.unwrap();
        store.clear_all().await.unwrap();
        let second = store.add(passport()).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_advances_updated_at() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let id = store
            .add(passport().with_notes("old").with_embedding(vec![1.0, 0.0]))
            .await
            .unwrap();
        let before = store.get(id).await.unwrap().unwrap();

        store
            .update(id, MemoryFields::new("Passport", "Top drawer"))
            .await
            .unwrap();

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.location, "Top drawer");
        assert_eq!(after.notes, None);
        assert_eq!(after.embedding, None);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let err = store.update(99, passport()).await.unwrap_err();
        assert!(matches!(err, RecallError::NotFound { id: 99 }));
        let err = store.update_embedding(99, vec![1.0]).await.unwrap_err();
        assert!(matches!(err, RecallError::NotFound { id: 99 }));
    }

    #[tokio::test]
    async fn update_embedding_touches_only_embedding() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let id = store.add(passport()).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap();

        store.update_embedding(id, vec![1.0, 0.0, 0.0]).await.unwrap();

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.embedding, Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(after.item_name, before.item_name);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn malformed_embedding_is_excluded_from_embedded_set() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let good = store.add(passport().with_embedding(vec![0.5, 0.5])).await.unwrap();
        let bad = store.add(MemoryFields::new("Wallet", "Coat")).await.unwrap();
        store
            .database()
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "UPDATE memories SET embedding = '[1.0, oops' WHERE id = ?1",
                    params![bad],
                )
            })
            .await
            .unwrap();

        let embedded = store.get_with_embeddings().await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].id, good);
        assert_eq!(store.get(bad).await.unwrap().unwrap().embedding, None);
    }

    #[tokio::test]
    async fn text_search_is_case_insensitive_across_fields() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let passport_id = store.add(passport()).await.unwrap();
        let notes_id = store
            .add(MemoryFields::new("Umbrella", "Car").with_notes("in the BAG pocket"))
            .await
            .unwrap();
        store.add(MemoryFields::new("Charger", "Desk drawer")).await.unwrap();

        let ids: Vec<i64> = store
            .text_search("bag")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![notes_id, passport_id]);
    }

    #[tokio::test]
    async fn text_search_folds_non_ascii() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let id = store.add(MemoryFields::new("Äpfel", "Küche")).await.unwrap();
        let hits = store.text_search("äPFEL").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
    }

    #[tokio::test]
    async fn empty_needle_matches_everything() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        store.add(passport()).await.unwrap();
        store.add(MemoryFields::new("Keys", "Hook")).await.unwrap();
        assert_eq!(store.text_search("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        let id = store.add(passport()).await.unwrap();
        store.delete(id).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.get_all().await.unwrap().iter().all(|r| r.id != id));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memories.db");
        let id = {
            let store = SqliteMemoryStore::open(&path, true).await.unwrap();
            let id = store.add(passport().with_embedding(vec![0.25, 0.75])).await.unwrap();
            store.close().await.unwrap();
            id
        };

        let store = SqliteMemoryStore::open(&path, true).await.unwrap();
        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.embedding, Some(vec![0.25, 0.75]));
    }

    #[tokio::test]
    async fn adapter_identity_and_health() {
        let store = SqliteMemoryStore::in_memory().await.unwrap();
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Storage);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
