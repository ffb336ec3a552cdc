//! HTTP API module for the to-do resource, landing page, metrics and docs.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
