//! Liveness endpoint — no dependency checks.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// `GET /` — liveness only.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        service: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
    })
}
