//! Insights Model

use super::user::Role;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All-time summary (admin only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_categories: i64,
    /// Sum of order totals
    pub revenue: Decimal,
    pub calculated_at: i64,
}

/// Dashboard counters, shaped by the caller's role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub role: Role,
    /// Hidden from non-admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_categories: i64,
}
