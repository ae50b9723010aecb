//! Postgres-backed order store.
//!
//! Schema lives in `crates/api/migrations/`. Every multi-row mutation runs
//! in an explicit transaction; in particular the cascade on order delete is
//! performed as delete-children-then-parent rather than leaning on the
//! schema-level `ON DELETE CASCADE` (which exists as a backstop).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};

use ordersvc_orders::{CreatedAtFilter, Order, OrderFilter, OrderItem, OrderStatus};

use super::{OrderStore, StoreError, StoreResult};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    async fn load_items(&self, order_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<OrderItem>>> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, price, quantity
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = item_from_row(&row)?;
            by_order.entry(item.order_id).or_default().push(item);
        }
        Ok(by_order)
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, customer_id, status, created_at, updated_at FROM orders WHERE TRUE",
        );
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(customer_id) = filter.customer_id.clone() {
            qb.push(" AND customer_id = ").push_bind(customer_id);
        }
        match &filter.created_at {
            Some(CreatedAtFilter::Day { start, end }) => {
                qb.push(" AND created_at >= ").push_bind(*start);
                qb.push(" AND created_at < ").push_bind(*end);
            }
            Some(CreatedAtFilter::At(instant)) => {
                qb.push(" AND created_at = ").push_bind(*instant);
            }
            None => {}
        }
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(backend)?;
        let mut orders = rows
            .iter()
            .map(order_from_row)
            .collect::<StoreResult<Vec<Order>>>()?;

        let ids: Vec<i64> = orders.iter().map(|order| order.id).collect();
        let mut items = self.load_items(&ids).await?;
        for order in &mut orders {
            order.items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, customer_id, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else { return Ok(None) };
        let mut order = order_from_row(&row)?;
        order.items = self
            .load_items(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(order))
    }

    async fn create_order(&self, mut order: Order) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query(
            "INSERT INTO orders (customer_id, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&order.customer_id)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;
        order.id = row.try_get("id").map_err(backend)?;

        for item in &mut order.items {
            item.order_id = order.id;
            item.id = insert_item(&mut tx, item).await?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(order)
    }

    async fn update_order(&self, id: i64, mut order: Order) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query(
            "UPDATE orders SET customer_id = $1, status = $2, updated_at = now()
             WHERE id = $3 RETURNING created_at, updated_at",
        )
        .bind(&order.customer_id)
        .bind(order.status.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or_else(StoreError::not_found)?;

        order.id = id;
        order.created_at = row.try_get("created_at").map_err(backend)?;
        order.updated_at = row.try_get("updated_at").map_err(backend)?;

        // Replace the item list wholesale; no orphaned leftovers.
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        for item in &mut order.items {
            item.order_id = id;
            item.id = insert_item(&mut tx, item).await?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn cancel_order(&self, id: i64) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query(
            "SELECT id, customer_id, status, created_at, updated_at
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or_else(StoreError::not_found)?;

        let mut order = order_from_row(&row)?;
        order.cancel().map_err(StoreError::Domain)?;

        let row = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2 RETURNING updated_at",
        )
        .bind(order.status.as_str())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;
        order.updated_at = row.try_get("updated_at").map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        order.items = self
            .load_items(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(order)
    }

    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        sqlx::query("SELECT id FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(StoreError::not_found)?;

        Ok(self
            .load_items(&[order_id])
            .await?
            .remove(&order_id)
            .unwrap_or_default())
    }

    async fn add_item(&self, order_id: i64, mut item: OrderItem) -> StoreResult<OrderItem> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Existence check and `updated_at` refresh in one statement.
        sqlx::query("UPDATE orders SET updated_at = now() WHERE id = $1 RETURNING id")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?
            .ok_or_else(StoreError::not_found)?;

        item.order_id = order_id;
        item.id = insert_item(&mut tx, &item).await?;

        tx.commit().await.map_err(backend)?;
        Ok(item)
    }

    async fn get_item(&self, order_id: i64, item_id: i64) -> StoreResult<OrderItem> {
        let row = sqlx::query(
            "SELECT id, order_id, product_id, price, quantity
             FROM order_items WHERE id = $1 AND order_id = $2",
        )
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(StoreError::not_found)?;

        item_from_row(&row)
    }

    async fn update_item(
        &self,
        order_id: i64,
        item_id: i64,
        mut item: OrderItem,
    ) -> StoreResult<OrderItem> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            "UPDATE order_items SET product_id = $1, price = $2, quantity = $3
             WHERE id = $4 AND order_id = $5 RETURNING id",
        )
        .bind(&item.product_id)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or_else(StoreError::not_found)?;

        sqlx::query("UPDATE orders SET updated_at = now() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        item.id = item_id;
        item.order_id = order_id;
        Ok(item)
    }

    async fn delete_item(&self, order_id: i64, item_id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let deleted = sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
            .bind(item_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?
            .rows_affected();

        if deleted > 0 {
            sqlx::query("UPDATE orders SET updated_at = now() WHERE id = $1")
                .bind(order_id)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    item: &OrderItem,
) -> StoreResult<i64> {
    let row = sqlx::query(
        "INSERT INTO order_items (order_id, product_id, price, quantity)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(item.order_id)
    .bind(&item.product_id)
    .bind(item.price)
    .bind(item.quantity)
    .fetch_one(&mut **tx)
    .await
    .map_err(backend)?;
    row.try_get("id").map_err(backend)
}

fn order_from_row(row: &PgRow) -> StoreResult<Order> {
    let status_name: String = row.try_get("status").map_err(backend)?;
    let status: OrderStatus = status_name
        .parse()
        .map_err(|e| StoreError::Backend(anyhow::anyhow!("corrupt status column: {e}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(backend)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(backend)?;

    Ok(Order {
        id: row.try_get("id").map_err(backend)?,
        customer_id: row.try_get("customer_id").map_err(backend)?,
        status,
        created_at,
        updated_at,
        items: Vec::new(),
    })
}

fn item_from_row(row: &PgRow) -> StoreResult<OrderItem> {
    let price: Decimal = row.try_get("price").map_err(backend)?;
    Ok(OrderItem {
        id: row.try_get("id").map_err(backend)?,
        order_id: row.try_get("order_id").map_err(backend)?,
        product_id: row.try_get("product_id").map_err(backend)?,
        price,
        quantity: row.try_get("quantity").map_err(backend)?,
    })
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}
