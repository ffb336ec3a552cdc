//! HTTP API handlers.

use std::path::PathBuf;

use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::metrics;
use crate::store::{JsonFileStore, TodoItem};
use crate::telemetry::{Point, Telemetry};

use super::extract::{AppJson, AppPath};
use super::openapi::ApiDoc;

/// Message returned by every delete.
pub const DELETED_MESSAGE: &str = "To-Do item deleted";

/// Detail returned when an update targets a missing id.
pub const NOT_FOUND_DETAIL: &str = "To-Do item not found";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing store, re-read on every request.
    pub store: JsonFileStore,
    /// Telemetry sinks.
    pub telemetry: Telemetry,
    /// Directory holding `index.html`.
    pub templates_dir: PathBuf,
    /// Prometheus render handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state without a Prometheus handle.
    pub fn new(store: JsonFileStore, telemetry: Telemetry, templates_dir: PathBuf) -> Self {
        Self {
            store,
            telemetry,
            templates_dir,
            prometheus: None,
        }
    }

    /// Attach the Prometheus render handle served at `/metrics`.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Query parameters for listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only return items whose description equals this value.
    pub user: Option<String>,
}

/// Delete acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Always "To-Do item deleted".
    pub message: String,
}

/// Items whose description equals `user`, or all items when no filter is given.
/// An empty filter counts as no filter.
pub fn filter_by_user(todos: Vec<TodoItem>, user: Option<&str>) -> Vec<TodoItem> {
    match user {
        Some(user) if !user.is_empty() => todos
            .into_iter()
            .filter(|todo| todo.description == user)
            .collect(),
        _ => todos,
    }
}

/// List to-do items.
#[utoipa::path(
    get,
    path = "/todos",
    params(ListParams),
    responses(
        (status = 200, description = "Stored items in insertion order", body = [TodoItem])
    )
)]
#[instrument(skip_all, fields(user = ?params.user))]
pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = state.store.load().await?;
    Ok(Json(filter_by_user(todos, params.user.as_deref())))
}

/// Create a to-do item. Ids are not checked for collisions.
#[utoipa::path(
    post,
    path = "/todos",
    request_body = TodoItem,
    responses(
        (status = 200, description = "Created item", body = TodoItem),
        (status = 422, description = "Body does not match the item schema", body = ErrorBody)
    )
)]
#[instrument(skip_all, fields(id = todo.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    AppJson(todo): AppJson<TodoItem>,
) -> Result<Json<TodoItem>, ApiError> {
    let mut todos = state.store.load().await?;
    todos.push(todo.clone());
    state.store.save(&todos).await?;
    info!(count = todos.len(), "todo created");

    metrics::inc_todos_created();
    let event = Point::new("business_events")
        .tag("event", "todo_created")
        .tag("priority", todo.priority.to_string())
        .field("count", 1i64)
        .stamped_now();
    state.telemetry.emit_point(event).await;

    Ok(Json(todo))
}

/// Replace the first item with the given id.
#[utoipa::path(
    put,
    path = "/todos/{id}",
    params(("id" = i64, Path, description = "Item id")),
    request_body = TodoItem,
    responses(
        (status = 200, description = "Updated item", body = TodoItem),
        (status = 404, description = "No item with this id", body = ErrorBody),
        (status = 422, description = "Invalid id or body", body = ErrorBody)
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn update_todo(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(updated): AppJson<TodoItem>,
) -> Result<Json<TodoItem>, ApiError> {
    let mut todos = state.store.load().await?;

    let slot = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or(ApiError::NotFound(NOT_FOUND_DETAIL))?;
    *slot = updated.clone();

    state.store.save(&todos).await?;
    info!("todo updated");

    Ok(Json(updated))
}

/// Remove every item with the given id. Succeeds even when nothing matched.
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Acknowledgement", body = DeleteResponse),
        (status = 422, description = "Invalid id", body = ErrorBody)
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut todos = state.store.load().await?;
    let before = todos.len();
    todos.retain(|todo| todo.id != id);
    state.store.save(&todos).await?;
    info!(removed = before - todos.len(), "todo delete");

    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
}

/// Landing page, served verbatim from the templates directory.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.templates_dir.join("index.html");
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(ApiError::Page)?;
    Ok(Html(content))
}

/// Prometheus exposition of the installed recorder.
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .prometheus
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default();

    ([(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")], body)
}

/// OpenAPI document for the to-do routes.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
