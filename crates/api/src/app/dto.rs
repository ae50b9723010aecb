//! Request DTOs for query parameters.
//!
//! Payload bodies deserialize straight into the domain drafts
//! (`OrderDraft`/`OrderItemDraft`), which are the single validation point.

use serde::Deserialize;

use ordersvc_core::DomainResult;
use ordersvc_orders::OrderFilter;

/// Optional list filters; compose conjunctively.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub created_at: Option<String>,
}

impl OrderListQuery {
    pub fn into_filter(self) -> DomainResult<OrderFilter> {
        OrderFilter::parse(
            self.status.as_deref(),
            self.customer_id.as_deref(),
            self.created_at.as_deref(),
        )
    }
}
