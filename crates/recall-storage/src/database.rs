// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::{Path, PathBuf};

use recall_core::RecallError;
use rusqlite::functions::FunctionFlags;
use tracing::{debug, info};

use crate::migrations;

/// Name of the Unicode-aware lower-casing SQL function registered on every connection.
pub const LOWER_FN: &str = "recall_lower";

/// Handle to the memory database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: Option<PathBuf>,
    wal_mode: bool,
}

impl Database {
    /// Opens (creating if needed) the database file and applies migrations.
    ///
    /// Any failure to reach the medium is reported as
    /// [`RecallError::StorageUnavailable`].
    pub async fn open(path: &Path, wal_mode: bool) -> Result<Self, RecallError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RecallError::StorageUnavailable {
                    reason: format!("cannot create {}: {e}", parent.display()),
                })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| RecallError::StorageUnavailable {
                reason: format!("cannot open {}: {e}", path.display()),
            })?;

        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
            wal_mode,
        };
        db.prepare().await?;
        info!(path = %path.display(), wal_mode, "memory database opened");
        Ok(db)
    }

    /// Opens a private in-memory database. Used by tests and ephemeral sessions.
    pub async fn open_in_memory() -> Result<Self, RecallError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| RecallError::StorageUnavailable {
                reason: format!("cannot open in-memory database: {e}"),
            })?;
        let db = Self {
            conn,
            path: None,
            wal_mode: false,
        };
        db.prepare().await?;
        Ok(db)
    }

    async fn prepare(&self) -> Result<(), RecallError> {
        let wal_mode = self.wal_mode;
        let migrated = self
            .conn
            .call(move |conn| -> Result<Result<(), RecallError>, rusqlite::Error> {
                apply_pragmas(conn, wal_mode)?;
                register_functions(conn)?;
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(|e| RecallError::StorageUnavailable {
                reason: format!("cannot configure database: {e}"),
            })?;
        migrated?;
        debug!("database pragmas, functions and migrations ready");
        Ok(())
    }

    /// The shared async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// File backing this database, or `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Checkpoints the WAL so the main file is self-contained.
    pub async fn close(&self) -> Result<(), RecallError> {
        if !self.wal_mode {
            return Ok(());
        }
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

fn apply_pragmas(conn: &rusqlite::Connection, wal_mode: bool) -> Result<(), rusqlite::Error> {
    if wal_mode {
        // journal_mode returns a row, so it cannot go through execute_batch.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    }
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )
}

fn register_functions(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Convert a tokio-rusqlite error into [`RecallError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RecallError {
    RecallError::storage(e)
}
