use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness only; does not touch the upstream provider.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK Generative AI" }))
}
