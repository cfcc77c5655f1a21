use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::TodoError;
use crate::model::{CreateTodo, PatchTodo, Todo, UpdateTodo};
use crate::query::{TodoQuery, DEFAULT_PAGE_SIZE};
use crate::AppState;

/// Listing parameters as they arrive on the query string.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
    pub q: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    pub sort: Option<String>,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Todo>>, TodoError> {
    let query = TodoQuery::new(
        params.completed,
        params.q.as_deref(),
        params.page,
        params.size,
        params.sort.as_deref(),
    )?;
    state.service.find_all(&query).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let todo = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, TodoError> {
    state.service.find_by_id(id).await.map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, TodoError> {
    state.service.update(id, input).await.map(Json)
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PatchTodo>,
) -> Result<Json<Todo>, TodoError> {
    state.service.patch(id, input).await.map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TodoError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
