// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer generation via `POST /chat/completions`.

use std::time::Duration;

use async_trait::async_trait;
use recall_config::CompletionConfig;
use recall_core::types::{CompletionRequest, CompletionResponse};
use recall_core::{
    AdapterType, Capability, CompletionAdapter, HealthStatus, PluginAdapter, RecallError,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

pub struct OpenAiCompleter {
    client: OpenAiClient,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &CompletionConfig) -> Result<Self, RecallError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
            Capability::Completion,
        )?;
        info!(model = %config.model, base_url = %config.base_url, "completion adapter initialized");
        Ok(Self::new(client, config.model.clone()))
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompleter {
    fn name(&self) -> &str {
        "openai-chat"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(self.client.probe().await)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        debug!("completion adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for OpenAiCompleter {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecallError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(request.prompt)],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };
        let response: ChatResponse = self.client.post_json("chat/completions", &body).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RecallError::Provider {
                message: "runtime returned no completion choices".to_string(),
                source: None,
            })?;

        Ok(CompletionResponse {
            text,
            model: response.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}
