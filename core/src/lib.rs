//! Transport-free client for the todo REST API.
//!
//! `TodoClient` turns each API call into an `HttpRequest` value and turns the
//! matching `HttpResponse` back into todos or an `ApiError`. Sending the
//! request is left to the host: the `todo-ui` proxy uses `reqwest`, the
//! integration tests use `ureq`.
//!
//! The wire types in `types` are kept separate from `todo-server`'s own
//! model, so this crate never pulls in axum or a store. The live-server
//! tests under `tests/` are what keep the two schemas in step.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, ListParams, PatchTodo, Todo, UpdateTodo};
