use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    /// Which price-source backend is wired in ("sim" or "postgres").
    source_provider: String,
    /// Whether a Slack webhook is configured for run reports.
    notifier_armed: bool,
}

/// GET /api/v1/health - component status
#[cfg_attr(feature = "swagger", utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service status and wired components"))
))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        source_provider: state.cfg.source.provider.clone(),
        notifier_armed: state.notifier.is_some(),
    })
}

/// GET /healthz - liveness probe
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}
