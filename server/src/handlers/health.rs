//! Liveness and readiness endpoints.
//!
//! Liveness never looks at dependencies. Readiness reports the outcome of the
//! one-shot startup probe and does not ping the store itself.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_time_ms: Option<i64>,
}

pub async fn live() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        startup_time_ms: None,
    })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.readiness.is_ready() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "UP",
                startup_time_ms: Some(state.readiness.startup_time_ms()),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "DOWN",
                startup_time_ms: None,
            }),
        )
    }
}
