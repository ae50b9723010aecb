//! Order aggregate: a customer purchase record owning its line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ordersvc_core::{DomainError, DomainResult};

use crate::item::{OrderItem, OrderItemDraft, OrderItemPayload};
use crate::payload::{check_short_string, parse_decimal, parse_timestamp};
use crate::status::OrderStatus;

/// A customer purchase record.
///
/// Items are owned by value: an item cannot outlive or exist independent of
/// exactly one Order, and replacing the item list on update discards the
/// previous children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// System-assigned identifier; 0 until persisted.
    pub id: i64,
    pub customer_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Raw, unvalidated Order payload as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Embedded item list; the field keeps the original wire name.
    #[serde(default, rename = "orderitem")]
    pub items: Option<Vec<OrderItemDraft>>,
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Serialized Order. Money as decimal strings, timestamps as ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub id: i64,
    pub customer_id: String,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
    pub orderitem: Vec<OrderItemPayload>,
}

impl Order {
    /// Validates a draft and constructs the aggregate.
    ///
    /// `customer_id` and `status` are required; the status name is matched
    /// case-insensitively. Embedded items are each validated via
    /// [`OrderItem::from_draft`]. A client-supplied `total_amount` that
    /// disagrees with the computed sum of line amounts is rejected.
    ///
    /// Timestamps default to `now` when the payload does not carry them;
    /// `created_at` is only honored at creation time, the stores keep it
    /// immutable afterwards.
    pub fn from_draft(draft: OrderDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        let customer_id = draft
            .customer_id
            .ok_or_else(|| DomainError::validation("missing customer_id"))?;
        check_short_string("customer_id", &customer_id)?;

        let status: OrderStatus = draft
            .status
            .ok_or_else(|| DomainError::validation("missing status"))?
            .parse()?;

        let items = draft
            .items
            .unwrap_or_default()
            .into_iter()
            .map(OrderItem::from_draft)
            .collect::<DomainResult<Vec<_>>>()?;

        let created_at = match draft.created_at {
            Some(raw) => parse_timestamp("created_at", &raw)?,
            None => now,
        };
        let updated_at = match draft.updated_at {
            Some(raw) => parse_timestamp("updated_at", &raw)?,
            None => now,
        };

        let order = Self {
            id: draft.id.unwrap_or(0),
            customer_id,
            status,
            created_at,
            updated_at,
            items,
        };

        if let Some(raw_total) = draft.total_amount.filter(|v| !v.is_null()) {
            let supplied = parse_decimal("total_amount", &raw_total)?;
            let computed = order.total_amount();
            if supplied != computed {
                tracing::debug!(%supplied, %computed, "rejecting contradictory total_amount");
                return Err(DomainError::validation(format!(
                    "total_amount {supplied} does not equal the sum of line amounts = {computed}"
                )));
            }
        }

        Ok(order)
    }

    /// Sum of `line_amount` over all items; 0 for an empty order.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_amount).sum()
    }

    /// The one guarded status transition: CREATED → CANCELED.
    ///
    /// Any other current state is a conflict. All other statuses remain
    /// freely settable through full-record update; that asymmetry is
    /// preserved from the original service.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status != OrderStatus::Created {
            return Err(DomainError::conflict(format!(
                "cannot cancel order in status {}",
                self.status
            )));
        }
        self.status = OrderStatus::Canceled;
        Ok(())
    }

    /// Converts the aggregate into its boundary representation.
    pub fn to_payload(&self) -> OrderPayload {
        OrderPayload {
            id: self.id,
            customer_id: self.customer_id.clone(),
            status: self.status.to_string(),
            total_amount: self.total_amount().to_string(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
            orderitem: self.items.iter().map(OrderItem::to_payload).collect(),
        }
    }
}

impl From<OrderPayload> for OrderDraft {
    fn from(payload: OrderPayload) -> Self {
        Self {
            id: Some(payload.id),
            customer_id: Some(payload.customer_id),
            status: Some(payload.status),
            items: Some(payload.orderitem.into_iter().map(Into::into).collect()),
            total_amount: Some(Value::String(payload.total_amount)),
            created_at: Some(payload.created_at),
            updated_at: Some(payload.updated_at),
        }
    }
}
