//! Raw payload field parsing.
//!
//! Numeric fields cross the boundary as canonical decimal strings, but
//! clients also send plain JSON numbers. These helpers accept either form
//! and fail with a field-naming validation error on anything else.

use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use ordersvc_core::{DomainError, DomainResult};

/// Parses a fixed-point decimal from a JSON string or number.
pub(crate) fn parse_decimal(field: &str, raw: &Value) -> DomainResult<Decimal> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(invalid(field, raw)),
    };
    Decimal::from_str(text.trim()).map_err(|_| invalid(field, raw))
}

/// Parses an integer from a JSON number or numeric string.
pub(crate) fn parse_integer(field: &str, raw: &Value) -> DomainResult<i64> {
    match raw {
        Value::Number(n) => n.as_i64().ok_or_else(|| invalid(field, raw)),
        Value::String(s) => i64::from_str(s.trim()).map_err(|_| invalid(field, raw)),
        _ => Err(invalid(field, raw)),
    }
}

/// Parses an ISO-8601 timestamp, with or without an offset.
///
/// Offset-less timestamps are interpreted as UTC.
pub(crate) fn parse_timestamp(field: &str, raw: &str) -> DomainResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| DomainError::validation(format!("invalid {field} '{raw}', expected ISO-8601")))
}

/// Validates a short identifier string (customer_id, product_id).
pub(crate) fn check_short_string(field: &str, value: &str) -> DomainResult<()> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    if value.len() > 16 {
        return Err(DomainError::validation(format!(
            "{field} must be at most 16 characters"
        )));
    }
    Ok(())
}

fn invalid(field: &str, raw: &Value) -> DomainError {
    DomainError::validation(format!("invalid {field} value {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_accepts_strings_and_numbers() {
        assert_eq!(parse_decimal("price", &json!("12.50")).unwrap().to_string(), "12.50");
        assert_eq!(parse_decimal("price", &json!(12.5)).unwrap().to_string(), "12.5");
        assert!(parse_decimal("price", &json!("twelve")).is_err());
        assert!(parse_decimal("price", &json!([])).is_err());
    }

    #[test]
    fn integer_accepts_strings_and_numbers() {
        assert_eq!(parse_integer("quantity", &json!(3)).unwrap(), 3);
        assert_eq!(parse_integer("quantity", &json!("3")).unwrap(), 3);
        assert!(parse_integer("quantity", &json!("3.5")).is_err());
        assert!(parse_integer("quantity", &json!(2.5)).is_err());
    }

    #[test]
    fn timestamp_accepts_offset_and_naive_forms() {
        assert!(parse_timestamp("created_at", "2020-01-10T09:00:00Z").is_ok());
        assert!(parse_timestamp("created_at", "2020-01-10T09:00:00+02:00").is_ok());
        assert!(parse_timestamp("created_at", "2020-01-10T09:00:00").is_ok());
        assert!(parse_timestamp("created_at", "not-a-date").is_err());
    }

    #[test]
    fn short_strings_are_bounded() {
        assert!(check_short_string("customer_id", "CUST-1").is_ok());
        assert!(check_short_string("customer_id", "").is_err());
        assert!(check_short_string("customer_id", "12345678901234567").is_err());
    }
}
