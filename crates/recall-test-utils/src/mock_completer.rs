// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion adapter for deterministic testing.
//!
//! Responses are popped from a FIFO queue. When the queue is empty, a
//! default "mock answer" text is returned. Every prompt is recorded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use recall_core::types::{CompletionRequest, CompletionResponse};
use recall_core::{
    AdapterType, Capability, CompletionAdapter, HealthStatus, PluginAdapter, RecallError,
};
use tokio::sync::Mutex;

pub struct MockCompleter {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    available: AtomicBool,
}

impl MockCompleter {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            ..Self::new()
        }
    }

    pub fn unavailable() -> Self {
        let c = Self::new();
        c.set_available(false);
        c
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockCompleter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompleter {
    fn name(&self) -> &str {
        "mock-completer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for MockCompleter {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecallError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RecallError::unavailable(
                Capability::Completion,
                "mock model not loaded",
            ));
        }
        self.prompts.lock().await.push(request.prompt);
        let text = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock answer".to_string());
        Ok(CompletionResponse {
            text,
            model: "mock".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            prompt: prompt.into(),
            max_tokens: 16,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn responses_are_fifo_then_default() {
        let c = MockCompleter::with_responses(vec!["first".into()]);
        c.add_response("second").await;
        assert_eq!(c.complete(request("a")).await.unwrap().text, "first");
        assert_eq!(c.complete(request("b")).await.unwrap().text, "second");
        assert_eq!(c.complete(request("c")).await.unwrap().text, "mock answer");
        assert_eq!(c.prompts().await, vec!["a", "b", "c"]);
    }
}
