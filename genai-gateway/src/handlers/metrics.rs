use axum::{http::header, response::IntoResponse};
use service_core::error::AppError;

pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    let body = crate::services::metrics::gather()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
