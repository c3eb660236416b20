//! Aggregation events and reports

use rust_decimal::Decimal;
use serde::Serialize;

/// Mutations that can invalidate an order's aggregate fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateEvent {
    /// An item of the order was created, updated or deleted
    LineItemChanged { order_id: i64 },
    /// The orders are about to be deleted; their items go first
    OrdersDeleting { order_ids: Vec<i64> },
    /// `GLOBAL_TAX_RATE` was written; `None` when the setting was removed.
    /// The sweep levies the committed value, `raw_value` is informational.
    TaxRateChanged { raw_value: Option<String> },
}

impl AggregateEvent {
    /// Stable name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            AggregateEvent::LineItemChanged { .. } => "line_item_changed",
            AggregateEvent::OrdersDeleting { .. } => "orders_deleting",
            AggregateEvent::TaxRateChanged { .. } => "tax_rate_changed",
        }
    }
}

/// Outcome of a tax-rate sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub rate: Decimal,
    pub orders_updated: u64,
    pub batches: u32,
    /// A newer rate change arrived and this sweep stopped early
    pub superseded: bool,
}

/// Outcome of [`super::AggregationEngine::reconcile_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub rate: Decimal,
    pub checked: u64,
    pub corrected: u64,
}
