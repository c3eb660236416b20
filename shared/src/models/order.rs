//! Order Model

use super::order_item::OrderItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Order status
///
/// Closed set; any status may follow any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Order entity
///
/// `subtotal`, `tax_amount` and `total_amount` are derived by the aggregation
/// engine and are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    /// Owning user (nullable, detached when the user is deleted)
    pub user_id: Option<i64>,
    /// Order date (millis)
    pub order_date: i64,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    /// Generated as `ORD-YYYYMMDD-NNNNNN` when absent
    #[validate(length(min = 1, max = 100))]
    pub order_number: Option<String>,
    pub user_id: Option<i64>,
    pub order_date: Option<i64>,
    pub status: Option<OrderStatus>,
    #[validate(length(max = 500))]
    pub shipping_address: Option<String>,
    #[validate(length(max = 100))]
    pub payment_method: Option<String>,
    #[validate(length(max = 100))]
    pub tracking_number: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update order payload (pass-through fields only)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderUpdate {
    pub user_id: Option<i64>,
    pub status: Option<OrderStatus>,
    #[validate(length(max = 500))]
    pub shipping_address: Option<String>,
    #[validate(length(max = 100))]
    pub payment_method: Option<String>,
    #[validate(length(max = 100))]
    pub tracking_number: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Order with its line items (show view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("cancelled_by_user".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
