//! Todo REST service.
//!
//! # Overview
//! `handlers` bind HTTP to `TodoService`, which validates input and talks to
//! a `TodoStore`. Listing goes through `TodoQuery` (filter, `updatedAt`
//! ordering, offset pagination). `Readiness` records the outcome of a single
//! store ping taken at startup.
//!
//! Routes:
//! - `POST /api/todos`, `GET /api/todos`
//! - `GET|PUT|PATCH|DELETE /api/todos/{id}`
//! - `GET /health/live`, `GET /health/ready`

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod query;
pub mod readiness;
pub mod service;
pub mod store;

pub use config::{Config, StoreConfig};
pub use error::TodoError;
pub use model::{CreateTodo, PatchTodo, Todo, UpdateTodo};
pub use query::{SortOrder, TodoQuery};
pub use readiness::Readiness;
pub use service::TodoService;
pub use store::{InMemoryTodoStore, SqliteTodoStore, StoreError, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
    pub readiness: Arc<Readiness>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, readiness: Arc<Readiness>) -> Self {
        Self {
            service: TodoService::new(store),
            readiness,
        }
    }
}

pub fn app(state: AppState) -> Router {
    use handlers::{health, todos};

    Router::new()
        .route("/api/todos", get(todos::list).post(todos::create))
        .route(
            "/api/todos/{id}",
            get(todos::get)
                .put(todos::update)
                .patch(todos::patch)
                .delete(todos::delete),
        )
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves an in-memory store on `listener`, probing readiness first.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());
    let readiness = Arc::new(Readiness::new());
    readiness.probe(store.as_ref()).await;
    axum::serve(listener, app(AppState::new(store, readiness))).await
}
