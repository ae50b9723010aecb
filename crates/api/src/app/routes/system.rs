//! Liveness and service self-description.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(json!({"status": 200, "message": "Healthy"}))).into_response()
}

/// Root URL response: service name, version, and endpoint catalog.
pub async fn index() -> axum::response::Response {
    let body = json!({
        "name": "Order REST API Service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "orders": {
                "list":   {"method": "GET",    "url": "/orders"},
                "create": {"method": "POST",   "url": "/orders"},
                "get":    {"method": "GET",    "url": "/orders/{id}"},
                "update": {"method": "PUT",    "url": "/orders/{id}"},
                "delete": {"method": "DELETE", "url": "/orders/{id}"},
                "cancel": {"method": "PUT",    "url": "/orders/{id}/cancel"},
            },
            "order_items": {
                "list":   {"method": "GET",    "url": "/orders/{id}/items"},
                "create": {"method": "POST",   "url": "/orders/{id}/items"},
                "get":    {"method": "GET",    "url": "/orders/{id}/items/{item_id}"},
                "update": {"method": "PUT",    "url": "/orders/{id}/items/{item_id}"},
                "delete": {"method": "DELETE", "url": "/orders/{id}/items/{item_id}"},
            },
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}
