// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embeddings via `POST /embeddings`.

use std::time::Duration;

use async_trait::async_trait;
use recall_config::EmbeddingConfig;
use recall_core::types::{EmbeddingInput, EmbeddingOutput};
use recall_core::{
    AdapterType, Capability, EmbeddingAdapter, HealthStatus, PluginAdapter, RecallError,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{EmbeddingRequest, EmbeddingResponse};

pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, RecallError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
            Capability::Embedding,
        )?;
        info!(model = %config.model, base_url = %config.base_url, "embedding adapter initialized");
        Ok(Self::new(client, config.model.clone()))
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(self.client.probe().await)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        debug!("embedding adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response: EmbeddingResponse =
            self.client.post_json("embeddings", &request).await?;

        if response.data.len() != expected {
            return Err(RecallError::Provider {
                message: format!(
                    "expected {expected} embeddings, runtime returned {}",
                    response.data.len()
                ),
                source: None,
            });
        }
        response.data.sort_by_key(|d| d.index);

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        let dimensions = embeddings.first().map_or(0, Vec::len);
        debug!(count = embeddings.len(), dimensions, "texts embedded");
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
