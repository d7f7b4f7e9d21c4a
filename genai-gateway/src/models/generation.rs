use serde::{Deserialize, Serialize};
use service_core::extract::{FromJsonBody, JsonFields};
use validator::Validate;

pub const DEFAULT_MAX_TOKENS: i64 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Body of `POST /generative-ai/generate`.
///
/// `max_tokens` and `temperature` are forwarded to the provider as given; no
/// range is enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(
        min = 1,
        code = "string_too_short",
        message = "String should have at least 1 character"
    ))]
    pub prompt: String,
    pub max_tokens: i64,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl FromJsonBody for GenerationRequest {
    fn from_fields(fields: &mut JsonFields) -> Option<Self> {
        let prompt = fields.required_str("prompt");
        let max_tokens = fields.optional_i64("max_tokens");
        let temperature = fields.optional_f64("temperature");

        Some(GenerationRequest {
            prompt: prompt?,
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response: String,
}
