//! Completion backend abstraction and HTTP implementation

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ChatMessage, CompletionOptions};

/// Chat-completion backend
///
/// Takes a list of independent message payloads and returns one raw response
/// item per payload, in the same order. The call fails as a whole on
/// transport or HTTP errors; a malformed individual item inside a successful
/// call surfaces as unparseable content, never as an `Err`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion per payload and return the raw response items
    async fn complete_batch(
        &self,
        model: &str,
        payloads: &[Vec<ChatMessage>],
        options: &CompletionOptions,
    ) -> Result<Vec<serde_json::Value>>;
}

/// Request body for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Reqwest-based backend for OpenAI-compatible APIs
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_endpoint: String,
    api_key: String,
}

impl HttpBackend {
    /// Build a backend from pipeline configuration
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Send a single chat-completion request
    async fn send_request(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<serde_json::Value> {
        let body = ChatRequest {
            model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        if status.is_success() {
            let json: serde_json::Value =
                response
                    .json()
                    .await
                    .map_err(|e| TranslationError::InvalidResponseError {
                        message: e.to_string(),
                    })?;
            Ok(json)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete_batch(
        &self,
        model: &str,
        payloads: &[Vec<ChatMessage>],
        options: &CompletionOptions,
    ) -> Result<Vec<serde_json::Value>> {
        // Requests run strictly in sequence; the first failure aborts the
        // whole batch so the caller's retry covers all items together.
        let mut responses = Vec::with_capacity(payloads.len());

        for (i, messages) in payloads.iter().enumerate() {
            debug!("Sending completion request {}/{}", i + 1, payloads.len());
            let response = self.send_request(model, messages, options).await?;
            responses.push(response);
        }

        Ok(responses)
    }
}
