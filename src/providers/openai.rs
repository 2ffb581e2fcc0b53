//! OpenAI-compatible chat completions client.
//!
//! Talks to `POST {base_url}/v1/chat/completions`, which OpenAI and most
//! self-hosted gateways expose.
//! See: <https://platform.openai.com/docs/api-reference/chat/create>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::ChatProvider;
use crate::types::{ChatOptions, ChatResponse, FinishReason, Message, Usage};
use crate::{Error, Result};

/// Default base URL for the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock, or
    /// for compatible gateways).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat completion request and return the first choice.
    pub async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = CompletionRequest {
            model: &options.model,
            messages,
            temperature: options.temperature,
        };

        debug!(model = %options.model, messages = messages.len(), "sending chat completion");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let response = Self::handle_response_errors(response, &options.model).await?;

        let completion: CompletionResponse = response.json().await?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(Error::EmptyResponse)?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: completion.usage,
            finish_reason: choice.finish_reason.unwrap_or_default(),
        })
    }

    /// Check response status and map to appropriate error.
    async fn handle_response_errors(
        response: reqwest::Response,
        model: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 => Err(Error::AuthenticationFailed),
            404 => Err(Error::ModelNotFound(model.to_string())),
            429 => {
                // Try to parse retry-after header
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(Error::RateLimited { retry_after })
            }
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorEnvelope>(&text)
                    .map(|e| e.error.message)
                    .unwrap_or_else(|_| format!("chat completion failed: {status}"));
                Err(Error::Api {
                    status: code,
                    message,
                })
            }
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<FinishReason>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        // Delegate to the inherent method
        OpenAiClient::chat(self, messages, options).await
    }
}
