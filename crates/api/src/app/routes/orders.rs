//! Order collection and single-order routes.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use ordersvc_orders::{Order, OrderDraft, OrderPayload};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:id/cancel", put(cancel_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::OrderListQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().list_orders(&filter).await {
        Ok(orders) => {
            let payloads: Vec<OrderPayload> = orders.iter().map(Order::to_payload).collect();
            (StatusCode::OK, Json(payloads)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<OrderDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let order = match Order::from_draft(draft, Utc::now()) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create_order(order).await {
        Ok(created) => {
            tracing::info!(order_id = created.id, "order created");
            let location = format!("/orders/{}", created.id);
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

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.store().get_order(id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order.to_payload())).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("order with id '{id}' not found"),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    body: Result<Json<OrderDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let order = match Order::from_draft(draft, Utc::now()) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().update_order(id, order).await {
        Ok(updated) => (StatusCode::OK, Json(updated.to_payload())).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.store().delete_order(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.store().cancel_order(id).await {
        Ok(order) => {
            tracing::info!(order_id = id, "order canceled");
            (StatusCode::OK, Json(order.to_payload())).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
