//! Order persistence: an explicit repository seam over the relational store.
//!
//! The `Order` aggregate owns its `OrderItem` children; every mutation goes
//! through the store so that cascade semantics and `updated_at` refreshes
//! live in one place. Two implementations exist: an in-memory store for dev
//! mode and black-box tests, and a Postgres store behind the `postgres`
//! feature.

use async_trait::async_trait;
use thiserror::Error;

use ordersvc_core::DomainError;
use ordersvc_orders::{Order, OrderFilter, OrderItem};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryOrderStore;
#[cfg(feature = "postgres")]
pub use postgres::PgOrderStore;

/// Store-level error: either a deterministic domain failure or a storage
/// backend failure. Backend failures surface as generic server errors and
/// are never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Request-scoped repository interface for the Order aggregate.
///
/// Identifier assignment and audit timestamps are store concerns:
/// `create_*` methods assign ids, `update_*`/`add_item`/`delete_item`
/// refresh the owning order's `updated_at`, and `created_at` is immutable
/// after creation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Lists orders matching the (conjunctive) filter, ordered by id.
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;

    /// Fetches one order with its items.
    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;

    /// Persists a validated order, assigning ids to it and its items.
    async fn create_order(&self, order: Order) -> StoreResult<Order>;

    /// Full-document update. Replaces the item list wholesale: previously
    /// attached items are deleted, never orphaned. Fails with `NotFound`
    /// for an unknown id; `created_at` is preserved from the stored row.
    async fn update_order(&self, id: i64, order: Order) -> StoreResult<Order>;

    /// Deletes an order and, as one atomic consequence, all of its items.
    /// Deleting a nonexistent order is a no-op.
    async fn delete_order(&self, id: i64) -> StoreResult<()>;

    /// Guarded transition CREATED → CANCELED. `NotFound` for an unknown
    /// order, `Conflict` for any other current status.
    async fn cancel_order(&self, id: i64) -> StoreResult<Order>;

    /// Lists the items of an order; `NotFound` if the order is missing.
    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>>;

    /// Appends a validated item to an existing order and refreshes the
    /// parent's `updated_at`; `NotFound` if the order is missing.
    async fn add_item(&self, order_id: i64, item: OrderItem) -> StoreResult<OrderItem>;

    /// Fetches one item; `NotFound` when the item is missing or does not
    /// belong to the given order.
    async fn get_item(&self, order_id: i64, item_id: i64) -> StoreResult<OrderItem>;

    /// Full update of an item; `NotFound` when missing or mismatched.
    async fn update_item(&self, order_id: i64, item_id: i64, item: OrderItem)
        -> StoreResult<OrderItem>;

    /// Deletes an item. Idempotent: a missing order, a missing item, or an
    /// order/item mismatch are all no-ops.
    async fn delete_item(&self, order_id: i64, item_id: i64) -> StoreResult<()>;
}
