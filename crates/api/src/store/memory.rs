//! In-memory order store (dev mode and black-box tests).

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use ordersvc_orders::{Order, OrderFilter, OrderItem};

use super::{OrderStore, StoreError, StoreResult};

/// `Mutex<BTreeMap>`-backed store. Orders own their items by value, so the
/// cascade on delete falls out of the data layout.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    orders: BTreeMap<i64, Order>,
    next_order_id: i64,
    next_item_id: i64,
}

impl Inner {
    fn next_order_id(&mut self) -> i64 {
        self.next_order_id += 1;
        self.next_order_id
    }

    fn next_item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; propagate the data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let inner = self.lock();
        Ok(inner
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn create_order(&self, mut order: Order) -> StoreResult<Order> {
        let mut inner = self.lock();
        order.id = inner.next_order_id();
        for item in &mut order.items {
            item.id = inner.next_item_id();
            item.order_id = order.id;
        }
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: i64, mut order: Order) -> StoreResult<Order> {
        let mut inner = self.lock();
        let Some(existing) = inner.orders.get(&id).cloned() else {
            return Err(StoreError::not_found());
        };

        order.id = id;
        order.created_at = existing.created_at;
        order.updated_at = Utc::now();
        for item in &mut order.items {
            item.id = inner.next_item_id();
            item.order_id = id;
        }
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> StoreResult<()> {
        self.lock().orders.remove(&id);
        Ok(())
    }

    async fn cancel_order(&self, id: i64) -> StoreResult<Order> {
        let mut inner = self.lock();
        let order = inner.orders.get_mut(&id).ok_or_else(StoreError::not_found)?;
        order.cancel().map_err(StoreError::Domain)?;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        let inner = self.lock();
        let order = inner.orders.get(&order_id).ok_or_else(StoreError::not_found)?;
        Ok(order.items.clone())
    }

    async fn add_item(&self, order_id: i64, mut item: OrderItem) -> StoreResult<OrderItem> {
        let mut inner = self.lock();
        let item_id = inner.next_item_id();
        let order = inner.orders.get_mut(&order_id).ok_or_else(StoreError::not_found)?;

        item.id = item_id;
        item.order_id = order_id;
        order.items.push(item.clone());
        order.updated_at = Utc::now();
        Ok(item)
    }

    async fn get_item(&self, order_id: i64, item_id: i64) -> StoreResult<OrderItem> {
        let inner = self.lock();
        inner
            .orders
            .get(&order_id)
            .and_then(|order| order.items.iter().find(|item| item.id == item_id))
            .cloned()
            .ok_or_else(StoreError::not_found)
    }

    async fn update_item(
        &self,
        order_id: i64,
        item_id: i64,
        item: OrderItem,
    ) -> StoreResult<OrderItem> {
        let mut inner = self.lock();
        let order = inner.orders.get_mut(&order_id).ok_or_else(StoreError::not_found)?;
        let slot = order
            .items
            .iter_mut()
            .find(|existing| existing.id == item_id)
            .ok_or_else(StoreError::not_found)?;

        slot.product_id = item.product_id;
        slot.price = item.price;
        slot.quantity = item.quantity;
        let updated = slot.clone();
        order.updated_at = Utc::now();
        Ok(updated)
    }

    async fn delete_item(&self, order_id: i64, item_id: i64) -> StoreResult<()> {
        let mut inner = self.lock();
        if let Some(order) = inner.orders.get_mut(&order_id) {
            let before = order.items.len();
            order.items.retain(|item| item.id != item_id);
            if order.items.len() != before {
                order.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordersvc_core::DomainError;
    use ordersvc_orders::{OrderDraft, OrderItemDraft};
    use serde_json::json;

    fn sample_order() -> Order {
        let draft = OrderDraft {
            customer_id: Some("CUST-1".to_string()),
            status: Some("CREATED".to_string()),
            items: Some(vec![OrderItemDraft {
                order_id: Some(0),
                product_id: Some("SKU-1".to_string()),
                price: Some(json!("12.50")),
                quantity: Some(json!(3)),
                ..OrderItemDraft::default()
            }]),
            ..OrderDraft::default()
        };
        Order::from_draft(draft, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_ids_and_reparents_items() {
        let store = MemoryOrderStore::new();
        let order = store.create_order(sample_order()).await.unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.items[0].id, 1);
        assert_eq!(order.items[0].order_id, order.id);
    }

    #[tokio::test]
    async fn update_replaces_items_and_preserves_created_at() {
        let store = MemoryOrderStore::new();
        let created = store.create_order(sample_order()).await.unwrap();

        let mut replacement = sample_order();
        replacement.items.clear();
        let updated = store.update_order(created.id, replacement).await.unwrap();

        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.items.is_empty());
        assert!(store.list_items(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_cascades() {
        let store = MemoryOrderStore::new();
        let order = store.create_order(sample_order()).await.unwrap();
        let item_id = order.items[0].id;

        store.delete_order(order.id).await.unwrap();
        store.delete_order(order.id).await.unwrap();

        assert!(store.get_order(order.id).await.unwrap().is_none());
        assert!(matches!(
            store.get_item(order.id, item_id).await,
            Err(StoreError::Domain(DomainError::NotFound))
        ));
    }

    #[tokio::test]
    async fn cancel_enforces_the_state_machine() {
        let store = MemoryOrderStore::new();
        let order = store.create_order(sample_order()).await.unwrap();

        let canceled = store.cancel_order(order.id).await.unwrap();
        assert_eq!(canceled.status.as_str(), "CANCELED");

        assert!(matches!(
            store.cancel_order(order.id).await,
            Err(StoreError::Domain(DomainError::Conflict(_)))
        ));
        assert!(matches!(
            store.cancel_order(9999).await,
            Err(StoreError::Domain(DomainError::NotFound))
        ));
    }

    #[tokio::test]
    async fn item_lookup_respects_ownership() {
        let store = MemoryOrderStore::new();
        let first = store.create_order(sample_order()).await.unwrap();
        let second = store.create_order(sample_order()).await.unwrap();

        let item_id = first.items[0].id;
        assert!(store.get_item(first.id, item_id).await.is_ok());
        assert!(matches!(
            store.get_item(second.id, item_id).await,
            Err(StoreError::Domain(DomainError::NotFound))
        ));
    }
}
