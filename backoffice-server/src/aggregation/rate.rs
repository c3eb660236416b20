//! Tax rate sources

use crate::db::repository::{RepoResult, setting};
use crate::order_money::parse_rate_lenient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::GLOBAL_TAX_RATE_KEY;
use sqlx::SqliteConnection;

/// Provides the tax rate (percent) used for recomputation.
///
/// Called with the recomputing transaction's connection so the rate belongs
/// to the same snapshot as the items it is levied on.
#[async_trait]
pub trait TaxRateSource: Send + Sync {
    async fn current_rate(&self, conn: &mut SqliteConnection) -> RepoResult<Decimal>;
}

/// Reads `GLOBAL_TAX_RATE` from the settings table.
///
/// A missing or unparseable value is rate 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsTaxRate;

#[async_trait]
impl TaxRateSource for SettingsTaxRate {
    async fn current_rate(&self, conn: &mut SqliteConnection) -> RepoResult<Decimal> {
        let raw = setting::get_value(&mut *conn, GLOBAL_TAX_RATE_KEY).await?;
        Ok(parse_rate_lenient(raw.as_deref()))
    }
}

/// A constant rate
#[derive(Debug, Clone, Copy)]
pub struct FixedTaxRate(pub Decimal);

#[async_trait]
impl TaxRateSource for FixedTaxRate {
    async fn current_rate(&self, _conn: &mut SqliteConnection) -> RepoResult<Decimal> {
        Ok(self.0)
    }
}
