// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory store backends for Recall.
//!
//! Two interchangeable [`MemoryBackend`](recall_core::MemoryBackend)
//! implementations: a WAL-mode SQLite table with embedded migrations, and a
//! single-document JSON store used when SQLite cannot be opened.
//! [`open_backend`] picks one at composition time.

pub mod backend;
pub mod database;
pub mod keyvalue;
pub mod migrations;
pub mod models;
pub mod sqlite;

pub use backend::open_backend;
pub use database::Database;
pub use keyvalue::KeyValueMemoryStore;
pub use sqlite::SqliteMemoryStore;
