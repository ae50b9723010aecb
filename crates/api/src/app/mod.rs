//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store selection and shared state
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs for query parameters
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    build_router(services)
}

/// Router over explicit services; tests use this with an in-memory store.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    routes::router().layer(Extension(services))
}
