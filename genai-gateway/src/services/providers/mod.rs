//! Upstream completion provider abstraction.
//!
//! The gateway talks to exactly one provider at a time; the trait exists so
//! the Groq client can be swapped for a scripted one in tests.

pub mod groq;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use groq::GroqProvider;
pub use mock::MockCompletionProvider;

/// Why a provider call failed.
///
/// The gateway reports every variant the same way (HTTP 500); the distinction
/// only feeds logs and metrics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Metric label for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential(_) => "missing_credential",
            ProviderError::Authentication(_) => "authentication",
            ProviderError::Network(_) => "network",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::Api { .. } => "api",
            ProviderError::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: i64,
    pub temperature: f64,
}

/// Text of the first choice plus whatever usage the provider reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
            input_tokens: None,
            output_tokens: None,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues a single completion call. Never retries.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
