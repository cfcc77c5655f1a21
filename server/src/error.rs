//! Error type shared by the service layer and the HTTP handlers.
//!
//! # Design
//! `NotFound` and `Validation` are client faults and carry a message that is
//! safe to return verbatim. `Storage` is a server fault: the response only
//! says the store is unavailable, the underlying cause goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),

    #[error("todo with id {0} not found")]
    NotFound(Uuid),

    #[error("storage unavailable")]
    Storage(#[from] StoreError),
}

impl TodoError {
    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Validation(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TodoError::Validation(_) => "VALIDATION_ERROR",
            TodoError::NotFound(_) => "NOT_FOUND",
            TodoError::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let TodoError::Storage(source) = &self {
            tracing::error!(status = %status, error = %source, "store request failed");
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
