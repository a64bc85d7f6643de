// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory core for Recall.
//!
//! - [`EmbeddingIndex`] keeps stored memories paired with embeddings.
//! - [`SimilarityRanker`] scores embedded memories against a query vector.
//! - [`QueryOrchestrator`] turns a question into ranked hits and an answer,
//!   degrading to substring search when embeddings are unavailable.
//!
//! Every model runtime is an injected trait object from `recall-core`, so
//! nothing here performs I/O beyond the memory store it is handed.

pub mod index;
pub mod orchestrator;
pub mod prompt;
pub mod ranker;
pub mod types;

pub use index::{EmbeddingIndex, ReindexReport};
pub use orchestrator::{QueryHit, QueryMode, QueryOrchestrator, QueryOutcome, QueryState};
pub use ranker::SimilarityRanker;
pub use types::{ScoredMemory, cosine_similarity, embedding_text};

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use recall_core::types::{
        CompletionRequest, CompletionResponse, EmbeddingInput, EmbeddingOutput,
    };
    use recall_core::{
        AdapterType, Capability, CompletionAdapter, EmbeddingAdapter, HealthStatus,
        PluginAdapter, RecallError,
    };

    /// How a stub collaborator responds.
    #[derive(Debug, Clone, Copy)]
    pub enum Behaviour {
        Ready,
        Unavailable,
        Failing,
        Hanging,
    }

    impl Behaviour {
        async fn gate(self, capability: Capability) -> Result<(), RecallError> {
            match self {
                Behaviour::Ready => Ok(()),
                Behaviour::Unavailable => {
                    Err(RecallError::unavailable(capability, "model not loaded"))
                }
                Behaviour::Failing => Err(RecallError::Provider {
                    message: "runtime crashed".into(),
                    source: None,
                }),
                Behaviour::Hanging => std::future::pending().await,
            }
        }
    }

    /// Letter-frequency embedding: identical texts score 1.0.
    pub fn letter_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; 26];
        for c in text.to_ascii_lowercase().bytes() {
            if c.is_ascii_lowercase() {
                v[usize::from(c - b'a')] += 1.0;
            }
        }
        v
    }

    macro_rules! stub_adapter {
        ($ty:ty, $name:literal, $kind:expr) => {
            #[async_trait]
            impl PluginAdapter for $ty {
                fn name(&self) -> &str {
                    $name
                }
                fn version(&self) -> semver::Version {
                    semver::Version::new(0, 1, 0)
                }
                fn adapter_type(&self) -> AdapterType {
                    $kind
                }
                async fn health_check(&self) -> Result<HealthStatus, RecallError> {
                    Ok(HealthStatus::Healthy)
                }
                async fn shutdown(&self) -> Result<(), RecallError> {
                    Ok(())
                }
            }
        };
    }

    pub struct StubEmbedder {
        behaviour: Behaviour,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StubEmbedder {
        pub fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                seen: Arc::default(),
            }
        }

        pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
            self.seen.clone()
        }
    }

    stub_adapter!(StubEmbedder, "stub-embedder", AdapterType::Embedding);

    #[async_trait]
    impl EmbeddingAdapter for StubEmbedder {
        async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
            self.behaviour.gate(Capability::Embedding).await?;
            self.seen.lock().unwrap().extend(input.texts.iter().cloned());
            Ok(EmbeddingOutput {
                embeddings: input.texts.iter().map(|t| letter_vector(t)).collect(),
                dimensions: 26,
            })
        }
    }

    pub struct StubCompleter {
        behaviour: Behaviour,
        reply: String,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl StubCompleter {
        pub fn new(behaviour: Behaviour, reply: &str) -> Self {
            Self {
                behaviour,
                reply: reply.to_string(),
                prompts: Arc::default(),
            }
        }

        pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
            self.prompts.clone()
        }
    }

    stub_adapter!(StubCompleter, "stub-completer", AdapterType::Completion);

    #[async_trait]
    impl CompletionAdapter for StubCompleter {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, RecallError> {
            self.behaviour.gate(Capability::Completion).await?;
            self.prompts.lock().unwrap().push(request.prompt);
            Ok(CompletionResponse {
                text: self.reply.clone(),
                model: "stub".into(),
            })
        }
    }
}
