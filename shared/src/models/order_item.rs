//! Order Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order line item
///
/// `unit_price` is a snapshot taken when the item is created, so later product
/// price changes do not touch placed orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// `round(unit_price * quantity, 2)` unless supplied explicitly
    pub line_total: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create line item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Copied from the product's current price when absent
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
}

/// Update line item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
}
