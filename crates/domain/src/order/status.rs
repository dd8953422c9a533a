//! Order status.

use serde::{Deserialize, Serialize};

/// Display status of a placed order.
///
/// Every order is created as `Pending`. The later stages exist in the
/// vocabulary for fulfillment tooling, but nothing in the core moves an
/// order past `Pending`; treat the field as write-once display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting fulfillment.
    #[default]
    Pending,

    /// Order is being prepared.
    Processing,

    /// Order has left the warehouse.
    Shipped,

    /// Order has arrived.
    Delivered,

    /// Order was cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_wire_format_is_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(OrderStatus::Shipped.to_string(), "shipped");
    }
}
