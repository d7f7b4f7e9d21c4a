//! Groq provider implementation.
//!
//! Calls the OpenAI-compatible chat completions endpoint and keeps only the
//! first choice.

use super::{ChatMessage, Completion, CompletionProvider, CompletionRequest, ProviderError};
use crate::config::GroqConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::time::Duration;

/// Groq text provider.
pub struct GroqProvider {
    config: GroqConfig,
    client: Client,
}

impl GroqProvider {
    /// Builds the HTTP client. A failure here is a configuration problem, not a
    /// provider call failure.
    pub fn new(config: GroqConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        let message = format!("Groq API error {}: {}", status.as_u16(), detail);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
            _ => ProviderError::Api {
                status: Some(status.as_u16()),
                message,
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingCredential("GROQ_API_KEY".to_string()))?;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            message_count = request.messages.len(),
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Sending request to Groq API"
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, &error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let api_response: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        let usage = api_response.usage.unwrap_or_default();
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("Response contained no choices".to_string()))?;

        let text = choice.message.content.ok_or_else(|| {
            ProviderError::MalformedResponse("First choice has no message content".to_string())
        })?;

        Ok(Completion {
            text,
            finish_reason: choice.finish_reason,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// Groq API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: i64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
