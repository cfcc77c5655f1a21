use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use todo_core::{CreateTodo, ListParams, PatchTodo, Todo, UpdateTodo};
use uuid::Uuid;

use crate::error::ProxyError;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Todo>>, ProxyError> {
    let client = state.backend.client();
    let response = state.backend.execute(client.build_list_todos(&params)).await?;
    Ok(Json(client.parse_list_todos(response)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ProxyError> {
    let client = state.backend.client();
    let response = state.backend.execute(client.build_create_todo(&input)?).await?;
    Ok((StatusCode::CREATED, Json(client.parse_create_todo(response)?)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, ProxyError> {
    let client = state.backend.client();
    let response = state.backend.execute(client.build_get_todo(id)).await?;
    Ok(Json(client.parse_get_todo(response)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, ProxyError> {
    let client = state.backend.client();
    let response = state
        .backend
        .execute(client.build_update_todo(id, &input)?)
        .await?;
    Ok(Json(client.parse_update_todo(response)?))
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PatchTodo>,
) -> Result<Json<Todo>, ProxyError> {
    let client = state.backend.client();
    let response = state
        .backend
        .execute(client.build_patch_todo(id, &input)?)
        .await?;
    Ok(Json(client.parse_patch_todo(response)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ProxyError> {
    let client = state.backend.client();
    let response = state.backend.execute(client.build_delete_todo(id)).await?;
    client.parse_delete_todo(response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Relays the backend's readiness answer; an unreachable backend is DOWN.
pub async fn backend_health(State(state): State<AppState>) -> Response {
    match state.backend.health().await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, [(header::CONTENT_TYPE, "application/json")], response.body).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "backend health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "DOWN", "error": error.to_string()})),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BackendInfo {
    url: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

pub async fn backend_info(State(state): State<AppState>) -> Json<BackendInfo> {
    Json(BackendInfo {
        url: state.backend.url().to_string(),
        kind: state.backend.kind().as_str(),
    })
}
