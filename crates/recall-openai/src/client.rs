// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local OpenAI-compatible model runtime.
//!
//! Provides [`OpenAiClient`], which handles URL construction, optional bearer
//! authentication, per-request timeouts, and error classification. Requests
//! are never retried.

use std::time::Duration;

use recall_core::{Capability, HealthStatus, RecallError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::ApiErrorResponse;

/// HTTP client bound to one runtime endpoint and one capability.
///
/// The capability decides which [`RecallError::CapabilityUnavailable`] is
/// reported when the runtime cannot be reached.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    capability: Capability,
}

impl OpenAiClient {
    /// Creates a client for `base_url`, e.g. `http://127.0.0.1:11434/v1`.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
        capability: Capability,
    ) -> Result<Self, RecallError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| RecallError::Config(format!("invalid API key header value: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RecallError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            capability,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a JSON body and decodes a JSON response.
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, RecallError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.send(path, self.client.post(self.url(path)).json(body))
            .await
    }

    /// Sends a multipart form and decodes a JSON response.
    pub async fn post_multipart<Resp>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Resp, RecallError>
    where
        Resp: DeserializeOwned,
    {
        self.send(path, self.client.post(self.url(path)).multipart(form))
            .await
    }

    async fn send<Resp>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Resp, RecallError>
    where
        Resp: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        debug!(%status, path, "runtime response received");

        let body = response.text().await.map_err(|e| self.classify(e))?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api) => format!("runtime returned {status}: {}", api.error.message),
                Err(_) => format!("runtime returned {status}: {body}"),
            };
            return Err(RecallError::Provider {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| RecallError::Provider {
            message: format!("failed to parse runtime response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Maps a transport failure onto the error kinds callers act on.
    fn classify(&self, e: reqwest::Error) -> RecallError {
        if e.is_timeout() {
            RecallError::Timeout {
                duration: self.timeout,
            }
        } else if e.is_connect() {
            RecallError::unavailable(
                self.capability,
                format!("cannot reach model runtime at {}", self.base_url),
            )
        } else {
            RecallError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }

    /// Probes `GET {base}/models`.
    pub async fn probe(&self) -> HealthStatus {
        match self.client.get(self.url("models")).send().await {
            Ok(resp) if resp.status().is_success() => HealthStatus::Healthy,
            Ok(resp) => HealthStatus::Degraded(format!("runtime returned {}", resp.status())),
            Err(e) => HealthStatus::Unhealthy(self.classify(e).to_string()),
        }
    }
}
