// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query orchestration: embed, rank, answer.
//!
//! A query moves `Idle -> Embedding -> Ranking -> Answering -> Done`, with
//! `Error` reachable from any step. When the embedding capability is not
//! available the query degrades to a plain substring search instead of
//! failing. The current state is published on a `watch` channel so a UI can
//! show an in-flight indicator; it never stays in a non-terminal state after
//! the query future completes or is dropped.

use std::sync::Arc;

use recall_config::model::{CompletionConfig, SearchConfig};
use recall_core::types::CompletionRequest;
use recall_core::{CompletionAdapter, MemoryRecord};
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::index::EmbeddingIndex;
use crate::prompt::{
    NO_SEMANTIC_MATCHES, NO_TEXT_MATCHES, SEARCH_FAILED, build_context, build_prompt,
};
use crate::ranker::SimilarityRanker;

/// States in the query FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryState {
    /// No query in flight.
    Idle,
    /// Computing the query vector.
    Embedding,
    /// Scoring stored memories, or running the substring search.
    Ranking,
    /// Waiting on the answer generator.
    Answering,
    /// Finished with results, an answer, or a canned message.
    Done,
    /// A collaborator failed unexpectedly.
    Error,
}

impl QueryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, QueryState::Done | QueryState::Error)
    }
}

/// Which search path produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryMode {
    Semantic,
    Text,
}

/// One result row. `similarity` is absent on the text path.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub memory: MemoryRecord,
    pub similarity: Option<f32>,
}

/// The terminal result of a query. Never an `Err`: faults become a message.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub state: QueryState,
    pub mode: QueryMode,
    pub hits: Vec<QueryHit>,
    pub answer: Option<String>,
    pub message: Option<String>,
}

impl QueryOutcome {
    fn idle(mode: QueryMode) -> Self {
        Self {
            state: QueryState::Idle,
            mode,
            hits: Vec::new(),
            answer: None,
            message: None,
        }
    }

    fn done(mode: QueryMode, hits: Vec<QueryHit>) -> Self {
        Self {
            state: QueryState::Done,
            mode,
            hits,
            answer: None,
            message: None,
        }
    }

    fn failed(mode: QueryMode, hits: Vec<QueryHit>) -> Self {
        Self {
            state: QueryState::Error,
            mode,
            hits,
            answer: None,
            message: Some(SEARCH_FAILED.to_string()),
        }
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Publishes state transitions and resets to `Idle` if dropped mid-flight.
struct InFlight<'a> {
    tx: &'a watch::Sender<QueryState>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(tx: &'a watch::Sender<QueryState>) -> Self {
        Self { tx, settled: false }
    }

    fn enter(&self, state: QueryState) {
        debug!(%state, "query state");
        self.tx.send_replace(state);
    }

    fn settle(mut self, outcome: QueryOutcome) -> QueryOutcome {
        self.enter(outcome.state);
        self.settled = true;
        outcome
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("query abandoned before completion");
            self.tx.send_replace(QueryState::Idle);
        }
    }
}

/// Answers "where did I put X?" queries over the memory store.
pub struct QueryOrchestrator {
    index: Arc<EmbeddingIndex>,
    completer: Option<Arc<dyn CompletionAdapter>>,
    ranker: SimilarityRanker,
    context_results: usize,
    max_tokens: u32,
    temperature: f32,
    state: watch::Sender<QueryState>,
}

impl QueryOrchestrator {
    pub const DEFAULT_CONTEXT_RESULTS: usize = 3;

    pub fn new(
        index: Arc<EmbeddingIndex>,
        completer: Option<Arc<dyn CompletionAdapter>>,
        ranker: SimilarityRanker,
    ) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            index,
            completer,
            ranker,
            context_results: Self::DEFAULT_CONTEXT_RESULTS,
            max_tokens: 256,
            temperature: 0.7,
            state,
        }
    }

    /// Builds an orchestrator with ranking and answer settings from config.
    pub fn from_config(
        index: Arc<EmbeddingIndex>,
        completer: Option<Arc<dyn CompletionAdapter>>,
        search: &SearchConfig,
        completion: &CompletionConfig,
    ) -> Self {
        Self::new(index, completer, SimilarityRanker::from_config(search)).with_answer_settings(
            search.context_results,
            completion.max_tokens,
            completion.temperature,
        )
    }

    /// Overrides how many results feed the prompt and the sampling settings.
    pub fn with_answer_settings(
        mut self,
        context_results: usize,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        self.context_results = context_results;
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        &self.index
    }

    /// The most recently published state.
    pub fn state(&self) -> QueryState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Runs a natural-language query.
    ///
    /// Falls back to [`QueryOrchestrator::search_text`] semantics when the
    /// embedding capability is unavailable.
    pub async fn ask(&self, query: &str) -> QueryOutcome {
        let query = query.trim();
        if query.is_empty() {
            return QueryOutcome::idle(QueryMode::Semantic);
        }

        let flight = InFlight::begin(&self.state);
        flight.enter(QueryState::Embedding);

        let vector = match self.index.embed_text(query).await {
            Ok(vector) => vector,
            Err(e) if e.is_capability_unavailable() => {
                info!(reason = %e, "semantic search unavailable, using text search");
                let outcome = self.run_text(&flight, query).await;
                return flight.settle(outcome);
            }
            Err(e) => {
                error!(error = %e, "query embedding failed");
                return flight.settle(QueryOutcome::failed(QueryMode::Semantic, Vec::new()));
            }
        };

        flight.enter(QueryState::Ranking);
        let candidates = match self.index.store().get_with_embeddings().await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "loading candidates failed");
                return flight.settle(QueryOutcome::failed(QueryMode::Semantic, Vec::new()));
            }
        };
        let hits: Vec<QueryHit> = self
            .ranker
            .rank(&vector, candidates)
            .into_iter()
            .map(|s| QueryHit {
                memory: s.memory,
                similarity: Some(s.score),
            })
            .collect();
        debug!(hits = hits.len(), "ranked memories");

        if hits.is_empty() {
            return flight.settle(
                QueryOutcome::done(QueryMode::Semantic, hits).with_message(NO_SEMANTIC_MATCHES),
            );
        }

        let Some(completer) = &self.completer else {
            return flight.settle(QueryOutcome::done(QueryMode::Semantic, hits));
        };

        flight.enter(QueryState::Answering);
        let context = build_context(hits.iter().take(self.context_results).map(|h| &h.memory));
        let request = CompletionRequest {
            prompt: build_prompt(query, &context),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let outcome = match completer.complete(request).await {
            Ok(response) => {
                let answer = response.text.trim();
                let mut outcome = QueryOutcome::done(QueryMode::Semantic, hits);
                outcome.answer = (!answer.is_empty()).then(|| answer.to_string());
                outcome
            }
            Err(e) if e.is_capability_unavailable() => {
                info!(reason = %e, "answer generation unavailable, returning ranked results");
                QueryOutcome::done(QueryMode::Semantic, hits)
            }
            Err(e) => {
                error!(error = %e, "answer generation failed");
                QueryOutcome::failed(QueryMode::Semantic, hits)
            }
        };
        flight.settle(outcome)
    }

    /// Runs a plain case-insensitive substring search.
    pub async fn search_text(&self, query: &str) -> QueryOutcome {
        let query = query.trim();
        if query.is_empty() {
            return QueryOutcome::idle(QueryMode::Text);
        }
        let flight = InFlight::begin(&self.state);
        let outcome = self.run_text(&flight, query).await;
        flight.settle(outcome)
    }

    async fn run_text(&self, flight: &InFlight<'_>, query: &str) -> QueryOutcome {
        flight.enter(QueryState::Ranking);
        match self.index.store().text_search(query).await {
            Ok(records) if records.is_empty() => {
                QueryOutcome::done(QueryMode::Text, Vec::new()).with_message(NO_TEXT_MATCHES)
            }
            Ok(records) => QueryOutcome::done(
                QueryMode::Text,
                records
                    .into_iter()
                    .map(|memory| QueryHit {
                        memory,
                        similarity: None,
                    })
                    .collect(),
            ),
            Err(e) => {
                warn!(error = %e, "text search failed");
                QueryOutcome::failed(QueryMode::Text, Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Behaviour, StubCompleter, StubEmbedder};
    use recall_core::{EmbeddingAdapter, MemoryBackend, MemoryFields};
    use recall_storage::KeyValueMemoryStore;

    async fn seeded(embedder: Option<StubEmbedder>) -> Arc<EmbeddingIndex> {
        let store: Arc<dyn MemoryBackend> = Arc::new(KeyValueMemoryStore::in_memory());
        let index = EmbeddingIndex::new(
            store,
            embedder.map(|e| Arc::new(e) as Arc<dyn EmbeddingAdapter>),
        );
        index
            .remember(MemoryFields::new("Passport", "Blue bag").with_notes("front pocket"))
            .await
            .unwrap();
        index
            .remember(MemoryFields::new("Charger", "Desk drawer"))
            .await
            .unwrap();
        Arc::new(index)
    }

    fn orchestrator(
        index: Arc<EmbeddingIndex>,
        completer: Option<StubCompleter>,
    ) -> QueryOrchestrator {
        QueryOrchestrator::new(
            index,
            completer.map(|c| Arc::new(c) as Arc<dyn CompletionAdapter>),
            SimilarityRanker::new(5).with_threshold(Some(0.3)),
        )
    }

    #[tokio::test]
    async fn semantic_query_answers_from_top_results() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let completer = StubCompleter::new(Behaviour::Ready, "It's in the blue bag.");
        let prompts = completer.prompts();
        let orch = orchestrator(index, Some(completer));

        let outcome = orch.ask("Passport Blue bag front pocket").await;

        assert_eq!(outcome.state, QueryState::Done);
        assert_eq!(outcome.mode, QueryMode::Semantic);
        assert_eq!(outcome.hits[0].memory.item_name, "Passport");
        assert!((outcome.hits[0].similarity.unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(outcome.answer.as_deref(), Some("It's in the blue bag."));
        assert_eq!(outcome.message, None);
        assert_eq!(orch.state(), QueryState::Done);

        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].contains("- Passport: Blue bag (front pocket)"));
        assert!(prompts[0].contains("Question: Passport Blue bag front pocket"));
    }

    #[tokio::test]
    async fn empty_query_stays_idle() {
        let orch = orchestrator(seeded(None).await, None);
        let outcome = orch.ask("   ").await;
        assert_eq!(outcome.state, QueryState::Idle);
        assert!(outcome.hits.is_empty());
        assert_eq!(orch.state(), QueryState::Idle);
    }

    #[tokio::test]
    async fn missing_embedder_falls_back_to_text_search() {
        let orch = orchestrator(seeded(None).await, None);
        let outcome = orch.ask("bag").await;
        assert_eq!(outcome.state, QueryState::Done);
        assert_eq!(outcome.mode, QueryMode::Text);
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].similarity, None);
    }

    #[tokio::test]
    async fn unavailable_embedder_falls_back_to_text_search() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Unavailable))).await;
        let orch = orchestrator(index, None);
        let outcome = orch.ask("umbrella").await;
        assert_eq!(outcome.mode, QueryMode::Text);
        assert_eq!(outcome.message.as_deref(), Some(NO_TEXT_MATCHES));
    }

    #[tokio::test]
    async fn embedding_fault_is_an_error_outcome() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Failing))).await;
        let orch = orchestrator(index, None);
        let outcome = orch.ask("passport").await;
        assert_eq!(outcome.state, QueryState::Error);
        assert_eq!(outcome.message.as_deref(), Some(SEARCH_FAILED));
        assert_eq!(orch.state(), QueryState::Error);
    }

    #[tokio::test]
    async fn nothing_above_threshold_is_done_with_message() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let completer = StubCompleter::new(Behaviour::Ready, "unused");
        let prompts = completer.prompts();
        let orch = orchestrator(index, Some(completer));

        let outcome = orch.ask("zzzz").await;

        assert_eq!(outcome.state, QueryState::Done);
        assert!(outcome.hits.is_empty());
        assert_eq!(outcome.message.as_deref(), Some(NO_SEMANTIC_MATCHES));
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_completer_returns_hits_without_answer() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let orch = orchestrator(index, Some(StubCompleter::new(Behaviour::Unavailable, "")));
        let outcome = orch.ask("Charger Desk drawer").await;
        assert_eq!(outcome.state, QueryState::Done);
        assert_eq!(outcome.hits[0].memory.item_name, "Charger");
        assert_eq!(outcome.answer, None);
    }

    #[tokio::test]
    async fn completion_fault_keeps_hits() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let orch = orchestrator(index, Some(StubCompleter::new(Behaviour::Failing, "")));
        let outcome = orch.ask("Charger Desk drawer").await;
        assert_eq!(outcome.state, QueryState::Error);
        assert!(!outcome.hits.is_empty());
        assert_eq!(outcome.message.as_deref(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn blank_answer_is_absent() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let orch = orchestrator(index, Some(StubCompleter::new(Behaviour::Ready, "  \n")));
        let outcome = orch.ask("Charger Desk drawer").await;
        assert_eq!(outcome.state, QueryState::Done);
        assert_eq!(outcome.answer, None);
    }

    #[tokio::test]
    async fn context_is_limited_to_context_results() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let completer = StubCompleter::new(Behaviour::Ready, "ok");
        let prompts = completer.prompts();
        let orch = QueryOrchestrator::new(
            index,
            Some(Arc::new(completer)),
            SimilarityRanker::new(5),
        )
        .with_answer_settings(1, 64, 0.0);

        let outcome = orch.ask("Passport Blue bag front pocket").await;
        assert_eq!(outcome.hits.len(), 2);
        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].contains("- Passport"));
        assert!(!prompts[0].contains("- Charger"));
    }

    #[tokio::test]
    async fn search_text_reports_no_matches() {
        let orch = orchestrator(seeded(None).await, None);
        let outcome = orch.search_text("umbrella").await;
        assert_eq!(outcome.mode, QueryMode::Text);
        assert_eq!(outcome.state, QueryState::Done);
        assert_eq!(outcome.message.as_deref(), Some(NO_TEXT_MATCHES));
    }

    #[tokio::test]
    async fn transitions_are_published() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let orch = orchestrator(index, Some(StubCompleter::new(Behaviour::Ready, "ok")));
        let mut rx = orch.subscribe();

        orch.ask("Passport Blue bag front pocket").await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), QueryState::Done);
    }

    #[tokio::test]
    async fn dropped_query_resets_indicator() {
        let index = seeded(Some(StubEmbedder::new(Behaviour::Ready))).await;
        let orch = orchestrator(index, Some(StubCompleter::new(Behaviour::Hanging, "")));

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            orch.ask("Passport Blue bag front pocket"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(orch.state(), QueryState::Idle);
    }

    #[test]
    fn state_names_are_lowercase() {
        assert_eq!(QueryState::Answering.to_string(), "answering");
        assert_eq!(QueryMode::Text.to_string(), "text");
        assert!(QueryState::Error.is_terminal());
        assert!(!QueryState::Ranking.is_terminal());
    }
}
