//! Turns a validated generation request into one provider call.

use super::metrics;
use super::providers::{ChatMessage, CompletionProvider, CompletionRequest, ProviderError};
use crate::models::{GenerationRequest, GenerationResponse};
use axum::http::StatusCode;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Customer-support persona sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "Eres un experto en atención al cliente con años de experiencia.
Proporciona respuestas profesionales, empáticas y orientadas a soluciones.
Mantén un tono amable y cercano, pero siempre profesional.";

pub const GENERATION_ERROR: &str = "Error generating response";

#[derive(Clone)]
pub struct CompletionService {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// System persona followed by the caller's prompt.
    pub fn build_request(request: &GenerationRequest) -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(request.prompt.clone()),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(
            model = %self.provider.model(),
            prompt_len = request.prompt.len(),
            max_tokens = request.max_tokens,
        )
    )]
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, AppError> {
        let completion_request = Self::build_request(&request);

        let started = Instant::now();
        let result = self.provider.complete(&completion_request).await;
        metrics::observe_provider_call(
            started.elapsed(),
            result.as_ref().err().map(ProviderError::kind),
        );

        match result {
            Ok(completion) => {
                tracing::info!(
                    input_tokens = ?completion.input_tokens,
                    output_tokens = ?completion.output_tokens,
                    finish_reason = ?completion.finish_reason,
                    "Generated completion"
                );
                Ok(GenerationResponse {
                    response: completion.text,
                })
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Provider call failed");
                Err(generation_error(&e))
            }
        }
    }
}

/// Every provider failure becomes the same 500, with the cause in `details`.
pub fn generation_error(err: &ProviderError) -> AppError {
    AppError::api(
        StatusCode::INTERNAL_SERVER_ERROR,
        GENERATION_ERROR,
        format!("{}: {}", GENERATION_ERROR, err),
    )
}
