//! Proxy errors and how they map back onto HTTP.
//!
//! # Design
//! A status the backend chose is the browser's answer too: `ApiError::Http`
//! is replayed with the backend's status and body. Failures to reach the
//! backend or to make sense of its reply are the proxy's own and become
//! `502 Bad Gateway`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use todo_core::ApiError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Api(ApiError::NotFound) => (
                StatusCode::NOT_FOUND,
                Json(json!({"code": "NOT_FOUND", "message": "todo not found"})),
            )
                .into_response(),
            ProxyError::Api(ApiError::Http { status, body }) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            ProxyError::Api(error) => {
                tracing::error!(%error, "unusable backend response");
                bad_gateway("BAD_BACKEND_RESPONSE", error.to_string())
            }
            ProxyError::Transport(error) => {
                tracing::error!(%error, "backend request failed");
                bad_gateway("BACKEND_UNREACHABLE", error.to_string())
            }
        }
    }
}

fn bad_gateway(code: &str, message: String) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"code": code, "message": message})),
    )
        .into_response()
}
