//! List-query filter translation.

use chrono::{DateTime, Days, NaiveDate, Utc};

use ordersvc_core::{DomainError, DomainResult};

use crate::order::Order;
use crate::payload::parse_timestamp;
use crate::status::OrderStatus;

/// Creation-time filter.
///
/// A date-only value matches the half-open interval
/// `[start-of-day, start-of-next-day)`; a full timestamp matches by exact
/// equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedAtFilter {
    Day {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    At(DateTime<Utc>),
}

impl CreatedAtFilter {
    pub fn matches(&self, created_at: DateTime<Utc>) -> bool {
        match self {
            CreatedAtFilter::Day { start, end } => *start <= created_at && created_at < *end,
            CreatedAtFilter::At(instant) => created_at == *instant,
        }
    }
}

/// Optional, conjunctive list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    pub created_at: Option<CreatedAtFilter>,
}

impl OrderFilter {
    /// Translates raw query parameters into a filter.
    ///
    /// An unknown status name or a malformed `created_at` value is a
    /// validation failure (surfaces as 400 at the boundary).
    pub fn parse(
        status: Option<&str>,
        customer_id: Option<&str>,
        created_at: Option<&str>,
    ) -> DomainResult<Self> {
        let status = status.map(str::parse).transpose()?;

        let created_at = created_at.map(parse_created_at).transpose()?;

        Ok(Self {
            status,
            customer_id: customer_id.map(str::to_string),
            created_at,
        })
    }

    /// Evaluates the conjunction against a single order.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(customer_id) = &self.customer_id {
            if &order.customer_id != customer_id {
                return false;
            }
        }
        if let Some(created_at) = &self.created_at {
            if !created_at.matches(order.created_at) {
                return false;
            }
        }
        true
    }
}

fn parse_created_at(raw: &str) -> DomainResult<CreatedAtFilter> {
    // Date-only form: `YYYY-MM-DD` (10 characters or fewer).
    if raw.len() <= 10 {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            DomainError::validation(format!("invalid created_at '{raw}', expected ISO-8601"))
        })?;
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + Days::new(1);
        return Ok(CreatedAtFilter::Day { start, end });
    }
    parse_timestamp("created_at", raw).map(CreatedAtFilter::At)
}
