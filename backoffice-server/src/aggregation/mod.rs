//! Order aggregation engine
//!
//! Keeps `subtotal`, `tax_amount` and `total_amount` of every order consistent
//! with its items and the global tax rate. Mutation paths emit an
//! [`AggregateEvent`]; the engine consumes it synchronously:
//!
//! - `LineItemChanged` / `OrdersDeleting` run on the caller's connection via
//!   [`AggregationEngine::handle`], inside the caller's transaction. A failure
//!   rolls the whole mutation back.
//! - `TaxRateChanged` runs after the setting is committed via
//!   [`AggregationEngine::handle_committed`], as a batched sweep. Each batch
//!   reads the committed rate from the rate source.
//!
//! Sweeps (and [`AggregationEngine::reconcile_all`]) are serialised on an
//! async mutex. Every rate change bumps a generation counter; a running sweep
//! that sees a newer generation stops, and the newer sweep covers every order.

mod event;
mod rate;

pub use event::{AggregateEvent, ReconcileReport, SweepReport};
pub use rate::{FixedTaxRate, SettingsTaxRate, TaxRateSource};

use crate::db::repository::{order, order_item};
use crate::order_money::OrderTotals;
use crate::utils::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Default number of orders per sweep transaction
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 500;

pub struct AggregationEngine {
    pool: SqlitePool,
    rates: Arc<dyn TaxRateSource>,
    sweep_batch_size: i64,
    sweep_lock: Mutex<()>,
    rate_generation: AtomicU64,
}

impl std::fmt::Debug for AggregationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("sweep_batch_size", &self.sweep_batch_size)
            .field("rate_generation", &self.rate_generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl AggregationEngine {
    pub fn new(pool: SqlitePool, rates: Arc<dyn TaxRateSource>, sweep_batch_size: usize) -> Self {
        Self {
            pool,
            rates,
            sweep_batch_size: i64::try_from(sweep_batch_size.max(1)).unwrap_or(i64::MAX),
            sweep_lock: Mutex::new(()),
            rate_generation: AtomicU64::new(0),
        }
    }

    /// Engine reading the rate from the `GLOBAL_TAX_RATE` setting
    pub fn with_settings_rate(pool: SqlitePool, sweep_batch_size: usize) -> Self {
        Self::new(pool, Arc::new(SettingsTaxRate), sweep_batch_size)
    }

    /// Handle a transactional event on the caller's connection.
    ///
    /// The caller must already hold the write lock on the affected orders
    /// (see `order::touch*`) and commits afterwards.
    pub async fn handle(&self, conn: &mut SqliteConnection, event: &AggregateEvent) -> AppResult<()> {
        tracing::trace!(event = event.name(), "Handling aggregate event");
        match event {
            AggregateEvent::LineItemChanged { order_id } => {
                self.recompute_order(conn, *order_id).await?;
            }
            AggregateEvent::OrdersDeleting { order_ids } => {
                let removed = order_item::delete_by_orders(conn, order_ids).await?;
                tracing::debug!(orders = order_ids.len(), items = removed, "Removed items of deleted orders");
            }
            AggregateEvent::TaxRateChanged { .. } => {
                return Err(AppError::internal(format!(
                    "{} must be dispatched after commit",
                    event.name()
                )));
            }
        }
        Ok(())
    }

    /// Handle an event outside any caller transaction.
    ///
    /// `TaxRateChanged` starts a sweep and returns its report. The sweep levies
    /// the committed rate, so `raw_value` is only logged. Transactional events
    /// get a transaction of their own; `OrdersDeleting` also deletes the orders.
    pub async fn handle_committed(&self, event: &AggregateEvent) -> AppResult<Option<SweepReport>> {
        tracing::trace!(event = event.name(), "Handling committed aggregate event");
        match event {
            AggregateEvent::TaxRateChanged { raw_value } => {
                tracing::debug!(raw_value = ?raw_value, "Tax rate changed, sweeping orders");
                self.sweep_tax_rate().await.map(Some)
            }
            AggregateEvent::LineItemChanged { order_id } => {
                self.recompute(*order_id).await?;
                Ok(None)
            }
            AggregateEvent::OrdersDeleting { order_ids } => {
                let mut tx = self.pool.begin().await?;
                let existing = order::touch_many(&mut tx, order_ids).await?;
                let deleting = AggregateEvent::OrdersDeleting { order_ids: existing.clone() };
                self.handle(&mut tx, &deleting).await?;
                let deleted = order::delete_many(&mut tx, &existing).await?;
                tx.commit().await?;
                tracing::info!(deleted, "Orders deleted");
                Ok(None)
            }
        }
    }

    /// Recompute one order's aggregates in the caller's transaction.
    ///
    /// Subtotal is the sum of the stored line totals, tax comes from the
    /// injected rate source, and all three fields are written in one statement.
    pub async fn recompute_order(&self, conn: &mut SqliteConnection, order_id: i64) -> AppResult<OrderTotals> {
        let line_totals = order_item::line_totals(&mut *conn, order_id).await?;
        let rate = self.rates.current_rate(&mut *conn).await?;
        let totals = OrderTotals::from_line_totals(line_totals, rate);

        if !order::write_aggregates(&mut *conn, order_id, &totals).await? {
            return Err(AppError::not_found(format!("Order {order_id} not found")));
        }

        tracing::debug!(
            order_id,
            subtotal = %totals.subtotal,
            rate = %rate,
            tax_amount = %totals.tax_amount,
            total_amount = %totals.total_amount,
            "Order aggregates recomputed"
        );
        Ok(totals)
    }

    /// Recompute one order in a transaction of its own
    pub async fn recompute(&self, order_id: i64) -> AppResult<OrderTotals> {
        let mut tx = self.pool.begin().await?;
        if !order::touch(&mut *tx, order_id).await? {
            return Err(AppError::not_found(format!("Order {order_id} not found")));
        }
        let totals = self.recompute_order(&mut tx, order_id).await?;
        tx.commit().await?;
        Ok(totals)
    }

    /// Re-levy the current rate on every order's stored subtotal, one
    /// transaction per batch.
    ///
    /// The rate is read inside each batch transaction, so the sweep that runs
    /// last always applies the last committed rate.
    pub async fn sweep_tax_rate(&self) -> AppResult<SweepReport> {
        let generation = self.rate_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.sweep_lock.lock().await;

        let mut report = SweepReport {
            rate: Decimal::ZERO,
            orders_updated: 0,
            batches: 0,
            superseded: false,
        };
        let mut after_id = 0;

        loop {
            if self.rate_generation.load(Ordering::SeqCst) != generation {
                report.superseded = true;
                break;
            }

            let mut tx = self.pool.begin().await?;
            order::touch_range(&mut *tx, after_id, self.sweep_batch_size).await?;
            let rate = self.rates.current_rate(&mut tx).await?;
            report.rate = rate;
            let batch = order::list_subtotals_after(&mut *tx, after_id, self.sweep_batch_size).await?;
            let Some(&(last_id, _)) = batch.last() else {
                tx.rollback().await?;
                break;
            };

            for (order_id, subtotal) in &batch {
                let totals = OrderTotals::levy(*subtotal, rate);
                order::write_aggregates(&mut *tx, *order_id, &totals).await?;
            }
            tx.commit().await?;

            report.batches += 1;
            report.orders_updated += batch.len() as u64;
            after_id = last_id;

            if (batch.len() as i64) < self.sweep_batch_size {
                break;
            }
        }

        if report.superseded {
            tracing::info!(
                rate = %report.rate,
                orders_updated = report.orders_updated,
                "Tax rate sweep superseded by a newer rate change"
            );
        } else {
            tracing::info!(
                rate = %report.rate,
                orders_updated = report.orders_updated,
                batches = report.batches,
                "Tax rate sweep completed"
            );
        }
        Ok(report)
    }

    /// Re-derive every subtotal from its items and re-levy the current rate.
    ///
    /// Only orders whose stored aggregates differ are rewritten.
    pub async fn reconcile_all(&self) -> AppResult<ReconcileReport> {
        let _guard = self.sweep_lock.lock().await;

        let mut report = ReconcileReport {
            rate: Decimal::ZERO,
            checked: 0,
            corrected: 0,
        };
        let mut after_id = 0;

        loop {
            let mut tx = self.pool.begin().await?;
            order::touch_range(&mut *tx, after_id, self.sweep_batch_size).await?;
            let rate = self.rates.current_rate(&mut tx).await?;
            let batch = order::list_snapshots_after(&mut *tx, after_id, self.sweep_batch_size).await?;
            let Some(last) = batch.last() else {
                tx.rollback().await?;
                break;
            };
            let last_id = last.id;

            for snapshot in &batch {
                let expected = OrderTotals::levy(snapshot.item_subtotal, rate);
                if expected != snapshot.stored {
                    tracing::warn!(
                        order_id = snapshot.id,
                        stored_subtotal = %snapshot.stored.subtotal,
                        item_subtotal = %snapshot.item_subtotal,
                        stored_total = %snapshot.stored.total_amount,
                        expected_total = %expected.total_amount,
                        "Order aggregates drifted, correcting"
                    );
                    order::write_aggregates(&mut *tx, snapshot.id, &expected).await?;
                    report.corrected += 1;
                }
            }
            tx.commit().await?;

            report.rate = rate;
            report.checked += batch.len() as u64;
            after_id = last_id;

            if (batch.len() as i64) < self.sweep_batch_size {
                break;
            }
        }

        tracing::info!(
            rate = %report.rate,
            checked = report.checked,
            corrected = report.corrected,
            "Order aggregates reconciled"
        );
        Ok(report)
    }
}
