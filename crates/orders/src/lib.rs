//! `ordersvc-orders` — Order/OrderItem business rules.
//!
//! The rules that must hold regardless of transport or storage:
//! - `line_amount` and `total_amount` are always recomputed from
//!   `price`/`quantity`/child items, never trusted from client input;
//! - `cancel` is the only guarded status transition (CREATED → CANCELED);
//! - list filters (status, customer, creation time) translate into a
//!   conjunctive predicate, with date-only values matching a whole day.

pub mod filter;
pub mod item;
pub mod order;
pub mod status;

mod payload;

pub use filter::{CreatedAtFilter, OrderFilter};
pub use item::{OrderItem, OrderItemDraft, OrderItemPayload};
pub use order::{Order, OrderDraft, OrderPayload};
pub use status::OrderStatus;
