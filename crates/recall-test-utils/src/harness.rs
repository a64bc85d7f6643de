// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end testing of the memory core.
//!
//! `TestHarness` assembles a store in a temp directory, mock model adapters,
//! an [`EmbeddingIndex`] and a [`QueryOrchestrator`], wired exactly as the
//! application wires them.

use std::sync::Arc;

use recall_config::model::{CompletionConfig, SearchConfig, StorageBackend, StorageConfig};
use recall_core::{CompletionAdapter, EmbeddingAdapter, MemoryBackend, MemoryFields, RecallError};
use recall_memory::{EmbeddingIndex, QueryOrchestrator, QueryOutcome};
use recall_storage::open_backend;

use crate::mock_completer::MockCompleter;
use crate::mock_embedder::MockEmbedder;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backend: StorageBackend,
    embedder: Option<Arc<MockEmbedder>>,
    completer: Option<Arc<MockCompleter>>,
    search: SearchConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            embedder: Some(Arc::new(MockEmbedder::new())),
            completer: Some(Arc::new(MockCompleter::new())),
            search: SearchConfig::default(),
        }
    }

    /// Selects the store variant (SQLite by default).
    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_embedder(mut self, embedder: MockEmbedder) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    /// No embedding capability at all.
    pub fn without_embedder(mut self) -> Self {
        self.embedder = None;
        self
    }

    pub fn with_completer(mut self, completer: MockCompleter) -> Self {
        self.completer = Some(Arc::new(completer));
        self
    }

    /// No answer generation capability at all.
    pub fn without_completer(mut self) -> Self {
        self.completer = None;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Build the test harness, creating the store in a temp directory.
    pub async fn build(self) -> Result<TestHarness, RecallError> {
        let temp_dir = tempfile::TempDir::new().map_err(RecallError::storage)?;
        let storage = StorageConfig {
            backend: self.backend,
            database_path: temp_dir.path().join("memories.db").to_string_lossy().into_owned(),
            kv_path: temp_dir.path().join("memories.json").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = open_backend(&storage).await?;

        let embedder = self.embedder.clone().map(|e| e as Arc<dyn EmbeddingAdapter>);
        let completer = self.completer.clone().map(|c| c as Arc<dyn CompletionAdapter>);
        let index = Arc::new(EmbeddingIndex::new(store.clone(), embedder));
        let orchestrator = QueryOrchestrator::from_config(
            index.clone(),
            completer,
            &self.search,
            &CompletionConfig::default(),
        );

        Ok(TestHarness {
            store,
            index,
            orchestrator,
            embedder: self.embedder,
            completer: self.completer,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete memory core with mock adapters and temp storage.
pub struct TestHarness {
    /// The store selected by the builder (temp files, cleaned up on drop).
    pub store: Arc<dyn MemoryBackend>,
    pub index: Arc<EmbeddingIndex>,
    pub orchestrator: QueryOrchestrator,
    pub embedder: Option<Arc<MockEmbedder>>,
    pub completer: Option<Arc<MockCompleter>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Adds a memory through the index, computing its embedding.
    pub async fn remember(&self, item: &str, location: &str) -> Result<i64, RecallError> {
        self.index.remember(MemoryFields::new(item, location)).await
    }

    pub async fn ask(&self, query: &str) -> QueryOutcome {
        self.orchestrator.ask(query).await
    }
}
