//! Order item routes, nested under their owning order.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use ordersvc_orders::{OrderItem, OrderItemDraft, OrderItemPayload};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/orders/:id/items", get(list_items).post(create_item))
        .route(
            "/orders/:id/items/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Path(order_id): Path<i64>,
) -> axum::response::Response {
    match services.store().list_items(order_id).await {
        Ok(items) => {
            let payloads: Vec<OrderItemPayload> =
                items.iter().map(OrderItem::to_payload).collect();
            (StatusCode::OK, Json(payloads)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(order_id): Path<i64>,
    body: Result<Json<OrderItemDraft>, JsonRejection>,
) -> axum::response::Response {
    let item = match validated_item(order_id, body) {
        Ok(item) => item,
        Err(response) => return response,
    };

    match services.store().add_item(order_id, item).await {
        Ok(created) => {
            tracing::info!(order_id, item_id = created.id, "order item created");
            let location = format!("/orders/{order_id}/items/{}", created.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(created.to_payload()),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services.store().get_item(order_id, item_id).await {
        Ok(item) => (StatusCode::OK, Json(item.to_payload())).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((order_id, item_id)): Path<(i64, i64)>,
    body: Result<Json<OrderItemDraft>, JsonRejection>,
) -> axum::response::Response {
    let item = match validated_item(order_id, body) {
        Ok(item) => item,
        Err(response) => return response,
    };

    match services.store().update_item(order_id, item_id, item).await {
        Ok(updated) => (StatusCode::OK, Json(updated.to_payload())).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services.store().delete_item(order_id, item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Extracts the body and validates it, with the path order id taking
/// precedence over any `order_id` in the payload.
fn validated_item(
    order_id: i64,
    body: Result<Json<OrderItemDraft>, JsonRejection>,
) -> Result<OrderItem, axum::response::Response> {
    let Json(mut draft) = body.map_err(errors::json_rejection_to_response)?;
    draft.order_id = Some(order_id);
    OrderItem::from_draft(draft).map_err(errors::domain_error_to_response)
}
