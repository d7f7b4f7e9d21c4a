use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Version tag carried by every error body.
pub const API_VERSION: &str = "1.0";

/// One failed field of a rejected request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path to the offending value, starting with `"body"`.
    pub location: Vec<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldViolation {
    pub fn new<I, L>(location: I, message: impl Into<String>, kind: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            location: location.into_iter().map(Into::into).collect(),
            message: message.into(),
            kind: kind.into(),
        }
    }

    /// Violation located at a top-level field of the request body.
    pub fn body_field(
        field: impl Into<String>,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            location: vec!["body".to_string(), field.into()],
            message: message.into(),
            kind: kind.into(),
        }
    }

    /// Violation of the body as a whole.
    pub fn body(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(["body"], message, kind)
    }
}

/// Body of a domain or upstream error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub mssg: String,
    pub details: String,
    pub version: String,
}

/// Body of a 400 response for a rejected request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationEnvelope {
    pub message: String,
    pub details: Vec<FieldViolation>,
    pub version: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {}", summarize(.0))]
    ValidationError(Vec<FieldViolation>),

    /// Error with an explicit status code, rendered verbatim.
    #[error("{description}: {details}")]
    ApiError {
        code: StatusCode,
        description: String,
        details: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.location.join("."), v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn api(
        code: StatusCode,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        AppError::ApiError {
            code,
            description: description.into(),
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ApiError { code, .. } => *code,
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Flattens `validator` failures into body-field violations, ordered by field name.
pub fn violations_from(errors: &validator::ValidationErrors) -> Vec<FieldViolation> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                FieldViolation::body_field(field.to_string(), message, err.code.to_string())
            })
        })
        .collect()
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(violations_from(&errors))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::ValidationError(details) => {
                tracing::debug!(violations = details.len(), "Rejected request body");
                (
                    status,
                    Json(ValidationEnvelope {
                        message: "Validation Error".to_string(),
                        details,
                        version: API_VERSION.to_string(),
                    }),
                )
                    .into_response()
            }
            AppError::ApiError {
                description,
                details,
                ..
            } => {
                if status.is_server_error() {
                    tracing::error!(status = %status, details = %details, "{}", description);
                }
                envelope(status, description, details)
            }
            AppError::ConfigError(err) | AppError::InternalError(err) => {
                tracing::error!(error = %err, "Unhandled error");
                envelope(status, "Internal Server Error".to_string(), err.to_string())
            }
        }
    }
}

fn envelope(status: StatusCode, mssg: String, details: String) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            mssg,
            details,
            version: API_VERSION.to_string(),
        }),
    )
        .into_response()
}

/// Converts a handler panic into a 500 envelope. Used with `CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(details = %details, "Handler panicked");
    envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
        details,
    )
}
