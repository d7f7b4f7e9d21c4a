use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::models::{GenerationRequest, GenerationResponse};
use crate::services::metrics::record_invalid_request;
use crate::startup::AppState;

#[tracing::instrument(skip(state, request))]
pub async fn generate(
    State(state): State<AppState>,
    request: Result<ValidatedJson<GenerationRequest>, AppError>,
) -> Result<Json<GenerationResponse>, AppError> {
    let ValidatedJson(request) = request.inspect_err(|e| {
        record_invalid_request();
        tracing::info!(error = %e, "Rejected generation request");
    })?;

    let response = state.completion.generate(request).await?;
    Ok(Json(response))
}
