//! OrderItem entity: a single product line within an Order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ordersvc_core::{DomainError, DomainResult};

use crate::payload::{check_short_string, parse_decimal, parse_integer};

/// A product line owned by exactly one [`crate::Order`].
///
/// `line_amount` is derived from `price * quantity` on every read; it is
/// never stored as an independent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// System-assigned identifier; 0 until persisted.
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    /// Unit price, fixed-point with exactly two fractional digits.
    pub price: Decimal,
    pub quantity: i64,
}

/// Raw, unvalidated OrderItem payload as received from a client.
///
/// Numeric fields stay as raw JSON values so that both decimal strings and
/// plain numbers are accepted; [`OrderItem::from_draft`] is the single
/// validation point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderItemDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub line_amount: Option<Value>,
}

/// Serialized OrderItem. All numeric fields are canonical decimal strings,
/// never binary floating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    pub price: String,
    pub quantity: String,
    pub line_amount: String,
}

impl OrderItem {
    /// Validates a draft and constructs the entity.
    ///
    /// Fails with a field-naming validation error when a required field is
    /// missing or unparsable, and when a client-supplied `line_amount`
    /// contradicts the computed `price * quantity` (contradictory input is
    /// rejected, never silently accepted).
    pub fn from_draft(draft: OrderItemDraft) -> DomainResult<Self> {
        let order_id = draft
            .order_id
            .ok_or_else(|| DomainError::validation("missing order_id"))?;

        let product_id = draft
            .product_id
            .ok_or_else(|| DomainError::validation("missing product_id"))?;
        check_short_string("product_id", &product_id)?;

        let raw_price = required("price", draft.price)?;
        let mut price = parse_decimal("price", &raw_price)?;
        if price.scale() > 2 {
            return Err(DomainError::validation(format!(
                "price {price} has more than 2 decimal places"
            )));
        }
        // Canonical two-digit scale; exact, no rounding can occur here.
        price.rescale(2);

        let raw_quantity = required("quantity", draft.quantity)?;
        let quantity = parse_integer("quantity", &raw_quantity)?;
        if quantity < 1 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }

        let computed = price * Decimal::from(quantity);
        if let Some(raw_line) = draft.line_amount.filter(|v| !v.is_null()) {
            let supplied = parse_decimal("line_amount", &raw_line)?;
            if supplied != computed {
                tracing::debug!(%supplied, %computed, "rejecting contradictory line_amount");
                return Err(DomainError::validation(format!(
                    "line_amount {supplied} does not equal price * quantity = {computed}"
                )));
            }
        }

        Ok(Self {
            id: draft.id.unwrap_or(0),
            order_id,
            product_id,
            price,
            quantity,
        })
    }

    /// `price * quantity`, exact decimal arithmetic.
    pub fn line_amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Converts the entity into its boundary representation.
    pub fn to_payload(&self) -> OrderItemPayload {
        OrderItemPayload {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id.clone(),
            price: self.price.to_string(),
            quantity: self.quantity.to_string(),
            line_amount: self.line_amount().to_string(),
        }
    }
}

impl From<OrderItemPayload> for OrderItemDraft {
    fn from(payload: OrderItemPayload) -> Self {
        Self {
            id: Some(payload.id),
            order_id: Some(payload.order_id),
            product_id: Some(payload.product_id),
            price: Some(Value::String(payload.price)),
            quantity: Some(Value::String(payload.quantity)),
            line_amount: Some(Value::String(payload.line_amount)),
        }
    }
}

fn required(field: &str, value: Option<Value>) -> DomainResult<Value> {
    match value {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(DomainError::validation(format!("missing {field}"))),
    }
}
