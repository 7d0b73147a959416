//! HTTP implementation of the inference contract.
//!
//! Posts the wire JSON to `<endpoint>/api/chat` and expects a
//! `{"response": "..."}` body. The reqwest client carries the per-request
//! timeout from configuration, so a stalled backend resolves into the same
//! failure path as a refused connection.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use kisan_core::config::InferenceConfig;

use crate::client::{InferenceClient, InferenceRequest};
use crate::error::InferenceError;

/// Inference client over the agri backend's HTTP endpoint.
pub struct HttpInferenceClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpInferenceClient {
    /// Build a client from configuration.
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.endpoint)
    }
}

/// Success body returned by the backend.
#[derive(Deserialize)]
struct ChatResponseBody {
    response: String,
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn generate(&self, request: InferenceRequest) -> Result<String, InferenceError> {
        let url = self.chat_url();
        debug!(
            url = %url,
            language = request.language.code(),
            has_image = request.image.is_some(),
            "sending inference request"
        );

        let response = self
            .http
            .post(&url)
            .json(&request.wire_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Backend {
                status: status.as_u16(),
            });
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        if body.response.is_empty() {
            return Err(InferenceError::MalformedResponse(
                "empty response text".to_string(),
            ));
        }

        Ok(body.response)
    }
}

// =============================================================================
// Tests
// =============================================================================
