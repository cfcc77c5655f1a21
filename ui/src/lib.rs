//! Browser-facing proxy in front of the todo server.
//!
//! # Overview
//! Every `/api/todos` call is rebuilt with `todo_core::TodoClient`, sent to
//! the backend by `Backend::execute`, and parsed back before it is returned,
//! so the proxy only ever forwards well-formed todos. Backend statuses other
//! than the expected one are replayed as-is (see `ProxyError`).
//!
//! Routes:
//! - `GET|POST /api/todos`, `GET|PUT|PATCH|DELETE /api/todos/{id}`
//! - `GET /api/backend/health`, `GET /api/backend/info`

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;

pub use backend::Backend;
pub use config::{BackendKind, Config};
pub use error::ProxyError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: Backend,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

pub fn app(state: AppState) -> Router {
    use handlers::{backend_health, backend_info, create, delete, list, patch, update};

    Router::new()
        .route("/api/todos", get(list).post(create))
        .route(
            "/api/todos/{id}",
            get(handlers::get).put(update).patch(patch).delete(delete),
        )
        .route("/api/backend/health", get(backend_health))
        .route("/api/backend/info", get(backend_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
