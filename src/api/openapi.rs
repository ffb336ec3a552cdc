//! OpenAPI document for the to-do API.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::store::{Priority, TodoItem};

use super::handlers::{self, DeleteResponse};

/// Generated API description served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "todo_service", description = "JSON-file backed to-do API"),
    paths(
        handlers::list_todos,
        handlers::create_todo,
        handlers::update_todo,
        handlers::delete_todo
    ),
    components(schemas(TodoItem, Priority, DeleteResponse, ErrorBody)),
    tags((name = "todos", description = "To-do item management"))
)]
pub struct ApiDoc;
