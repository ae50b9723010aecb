//! Routing tree: one module per resource.

use axum::routing::get;
use axum::Router;

pub mod items;
pub mod orders;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/", get(system::index))
        .merge(orders::router())
        .merge(items::router())
}
