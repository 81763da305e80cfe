//! API error types with the service's JSON error envelope.
//!
//! Two caller-visible kinds: validation errors (400, stable message) and
//! provider/render failures (500). The diagnosis path deliberately surfaces
//! the upstream detail — it is a diagnostic endpoint for a trusted client —
//! while report rendering failures are reduced to a generic message and only
//! logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error envelope: `{"status":"error","message":...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The multipart upload carried no identifiable file field.
    #[error("no image uploaded")]
    MissingImage,
    /// The multipart stream itself could not be read (truncated or
    /// malformed body).
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    /// Image decoding, the provider call, or reply parsing failed.
    #[error("{0}")]
    Provider(String),
    /// PDF rendering failed. Detail stays in the server log.
    #[error("failed to generate report")]
    Render(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingImage => {
                (StatusCode::BAD_REQUEST, "no image uploaded".to_string())
            }
            ApiError::InvalidUpload(detail) => (
                StatusCode::BAD_REQUEST,
                format!("invalid upload: {detail}"),
            ),
            ApiError::Provider(detail) => {
                tracing::error!(detail, "analysis request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, detail.clone())
            }
            ApiError::Render(detail) => {
                tracing::error!(detail, "report rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to generate report".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: "error",
            message,
        };
        (status, Json(body)).into_response()
    }
}
