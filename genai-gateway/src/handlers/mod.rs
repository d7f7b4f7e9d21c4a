//! HTTP handlers for the generative AI gateway.

pub mod generate;
pub mod health;
pub mod metrics;

use axum::http::{StatusCode, Uri};
use service_core::error::AppError;

/// Fallback for unknown routes, so they get the same envelope as every other error.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::api(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("No route for {}", uri.path()),
    )
}
