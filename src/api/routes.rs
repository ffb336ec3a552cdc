//! HTTP API route definitions.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use super::handlers::{
    create_todo, delete_todo, index, list_todos, metrics_endpoint, openapi, update_todo, AppState,
};
use super::middleware::{access_log, request_metrics};

/// Create the API router with the logging and metrics stages around every route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Landing page
        .route("/", get(index))
        // To-do resource
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        // Observability and docs
        .route("/metrics", get(metrics_endpoint))
        .route("/openapi.json", get(openapi))
        // The last layer added runs first: logging wraps metrics.
        .layer(middleware::from_fn_with_state(state.clone(), request_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), access_log))
        .with_state(state)
}
