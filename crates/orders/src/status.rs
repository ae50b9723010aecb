//! Order status lifecycle enumeration.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use ordersvc_core::DomainError;

/// Status of an [`crate::Order`].
///
/// The enumeration is string-keyed at every boundary (JSON, SQL, query
/// parameters); no numeric ordinal is ever exposed or stored.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Created,
    Paid,
    Canceled,
    Shipped,
    Fulfilled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Canceled,
        OrderStatus::Shipped,
        OrderStatus::Fulfilled,
        OrderStatus::Refunded,
    ];

    /// Canonical name, as serialized in payloads and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Fulfilled => "FULFILLED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Matches the enumeration by name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                DomainError::validation(format!(
                    "unknown status '{s}', valid statuses: {valid:?}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("CREATED".parse::<OrderStatus>().unwrap(), OrderStatus::Created);
        assert_eq!("paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Canceled);
        assert_eq!(" shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "BOGUS".parse::<OrderStatus>().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("BOGUS")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_every_name() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn defaults_to_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }
}
