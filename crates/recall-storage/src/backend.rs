// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition-time selection of the memory store variant.

use std::path::Path;
use std::sync::Arc;

use recall_config::model::{StorageBackend, StorageConfig};
use recall_core::{MemoryBackend, PluginAdapter, RecallError};
use tracing::{info, warn};

use crate::keyvalue::KeyValueMemoryStore;
use crate::sqlite::SqliteMemoryStore;

/// Builds the configured store.
///
/// With [`StorageBackend::Auto`], SQLite is tried first and the key-value
/// store is used only when SQLite reports the medium as unavailable. Other
/// SQLite errors are returned as-is.
pub async fn open_backend(config: &StorageConfig) -> Result<Arc<dyn MemoryBackend>, RecallError> {
    let database_path = Path::new(&config.database_path);
    let kv_path = Path::new(&config.kv_path);

    let backend: Arc<dyn MemoryBackend> = match config.backend {
        StorageBackend::Sqlite => {
            Arc::new(SqliteMemoryStore::open(database_path, config.wal_mode).await?)
        }
        StorageBackend::KeyValue => Arc::new(KeyValueMemoryStore::open(kv_path).await?),
        StorageBackend::Auto => match SqliteMemoryStore::open(database_path, config.wal_mode).await
        {
            Ok(store) => Arc::new(store),
            Err(RecallError::StorageUnavailable { reason }) => {
                warn!(%reason, fallback = %kv_path.display(), "SQLite unavailable, using key-value store");
                Arc::new(KeyValueMemoryStore::open(kv_path).await?)
            }
            Err(e) => return Err(e),
        },
    };
    info!(backend = backend.name(), "memory store ready");
    Ok(backend)
}
