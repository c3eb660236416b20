//! Settings Service
//!
//! Typed key/value settings. `GLOBAL_TAX_RATE` is special: its value must be
//! a non-negative number, and every committed change is followed by a tax
//! sweep over all orders.

use crate::aggregation::{AggregateEvent, AggregationEngine};
use crate::db::repository::setting;
use crate::order_money::parse_rate_strict;
use crate::utils::validation::{validate_setting_key, validate_setting_value};
use crate::utils::{AppError, AppResult};
use shared::models::{GLOBAL_TAX_RATE_KEY, Setting, SettingCreate, SettingType, SettingUpdate};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SettingsService {
    pool: SqlitePool,
    engine: Arc<AggregationEngine>,
}

impl SettingsService {
    pub fn new(pool: SqlitePool, engine: Arc<AggregationEngine>) -> Self {
        Self { pool, engine }
    }

    pub async fn list(&self) -> AppResult<Vec<Setting>> {
        Ok(setting::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Setting> {
        setting::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting {id} not found")))
    }

    pub async fn get_by_key(&self, key: &str) -> AppResult<Setting> {
        setting::find_by_key(&self.pool, key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting {key} not found")))
    }

    /// Raw value of `key`; absent setting and NULL value are both `None`
    pub async fn get_value(&self, key: &str) -> AppResult<Option<String>> {
        Ok(setting::get_value(&self.pool, key).await?)
    }

    pub async fn create(&self, data: SettingCreate) -> AppResult<Setting> {
        validate_setting_key(&data.key)?;
        let value_type = data.value_type.unwrap_or_default();
        check_value(&data.key, data.value.as_deref(), value_type)?;

        let created = setting::create(
            &self.pool,
            &data.key,
            data.value.as_deref(),
            value_type,
            data.description.as_deref(),
        )
        .await?;
        tracing::info!(key = %created.key, "Setting created");

        if created.is_tax_rate() {
            self.rate_changed(created.value.clone()).await?;
        }
        Ok(created)
    }

    /// Update value, type or description; the key is immutable
    pub async fn update(&self, id: i64, data: SettingUpdate) -> AppResult<Setting> {
        let existing = self.get(id).await?;
        let value_type = data.value_type.unwrap_or(existing.value_type);
        let value = data.value.as_deref().or(existing.value.as_deref());
        check_value(&existing.key, value, value_type)?;

        let updated = setting::update(
            &self.pool,
            id,
            data.value.as_deref(),
            data.value_type,
            data.description.as_deref(),
        )
        .await?;
        tracing::info!(key = %updated.key, "Setting updated");

        if updated.is_tax_rate() && data.value.is_some() {
            self.rate_changed(updated.value.clone()).await?;
        }
        Ok(updated)
    }

    /// Removing the tax rate levies 0 on every order
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let key = setting::delete(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting {id} not found")))?;
        tracing::info!(%key, "Setting deleted");

        if key == GLOBAL_TAX_RATE_KEY {
            self.rate_changed(None).await?;
        }
        Ok(())
    }

    async fn rate_changed(&self, raw_value: Option<String>) -> AppResult<()> {
        let event = AggregateEvent::TaxRateChanged { raw_value };
        if let Some(report) = self.engine.handle_committed(&event).await? {
            tracing::info!(
                rate = %report.rate,
                orders_updated = report.orders_updated,
                superseded = report.superseded,
                "Tax rate change applied"
            );
        }
        Ok(())
    }
}

/// Type check; the tax rate must be a non-negative percentage whatever its type tag
fn check_value(key: &str, value: Option<&str>, value_type: SettingType) -> AppResult<()> {
    if key != GLOBAL_TAX_RATE_KEY {
        return validate_setting_value(value, value_type);
    }
    if let Some(raw) = value {
        parse_rate_strict(raw)
            .map_err(|reason| AppError::validation(format!("{GLOBAL_TAX_RATE_KEY}: {reason}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{order, order_item};
    use crate::db::repository::order_item::NewOrderItem;
    use rust_decimal::Decimal;
    use shared::models::{OrderCreate, ProductCreate};

    async fn setup() -> (SqlitePool, SettingsService) {
        let db = DbService::open_in_memory().await.unwrap();
        let engine = Arc::new(AggregationEngine::with_settings_rate(db.pool.clone(), 100));
        let svc = SettingsService::new(db.pool.clone(), engine);
        (db.pool, svc)
    }

    fn tax_rate(value: &str) -> SettingCreate {
        SettingCreate {
            key: GLOBAL_TAX_RATE_KEY.into(),
            value: Some(value.into()),
            value_type: Some(SettingType::Number),
            description: Some("Percent".into()),
        }
    }

    /// Order with a single 100.00 item and zero tax
    async fn seed_order(pool: &SqlitePool) -> i64 {
        let product_id = crate::db::repository::product::create(
            pool,
            &ProductCreate {
                name: "Widget".into(),
                description: None,
                price: Decimal::ONE_HUNDRED,
                stock: None,
                sku: None,
                image_url: None,
                is_active: None,
                category_id: None,
            },
        )
        .await
        .unwrap()
        .id;
        let order_id = order::create(pool, &OrderCreate::default()).await.unwrap().id;
        order_item::create(
            pool,
            &NewOrderItem {
                order_id,
                product_id,
                quantity: 1,
                unit_price: Decimal::ONE_HUNDRED,
                line_total: Decimal::ONE_HUNDRED,
            },
        )
        .await
        .unwrap();
        order::write_aggregates(
            pool,
            order_id,
            &crate::order_money::OrderTotals::levy(Decimal::ONE_HUNDRED, Decimal::ZERO),
        )
        .await
        .unwrap();
        order_id
    }

    async fn total(pool: &SqlitePool, order_id: i64) -> Decimal {
        order::find_by_id(pool, order_id).await.unwrap().unwrap().total_amount
    }

    #[tokio::test]
    async fn test_tax_rate_create_update_delete_sweeps() {
        let (pool, svc) = setup().await;
        let order_id = seed_order(&pool).await;

        let created = svc.create(tax_rate("8")).await.unwrap();
        assert_eq!(total(&pool, order_id).await, Decimal::new(10800, 2));

        svc.update(
            created.id,
            SettingUpdate {
                value: Some("12.5%".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(total(&pool, order_id).await, Decimal::new(11250, 2));

        svc.delete(created.id).await.unwrap();
        assert_eq!(total(&pool, order_id).await, Decimal::new(10000, 2));
        assert_eq!(svc.get_value(GLOBAL_TAX_RATE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_tax_rate_rejected() {
        let (pool, svc) = setup().await;
        let order_id = seed_order(&pool).await;

        let mut payload = tax_rate("eight");
        payload.value_type = Some(SettingType::String);
        assert!(matches!(svc.create(payload).await, Err(AppError::Validation(_))));
        assert!(matches!(svc.create(tax_rate("-5")).await, Err(AppError::Validation(_))));

        let created = svc.create(tax_rate("10")).await.unwrap();
        let err = svc
            .update(
                created.id,
                SettingUpdate {
                    value: Some("ten".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(svc.get_value(GLOBAL_TAX_RATE_KEY).await.unwrap().as_deref(), Some("10"));
        assert_eq!(total(&pool, order_id).await, Decimal::new(11000, 2));
    }

    #[tokio::test]
    async fn test_typed_values() {
        let (_pool, svc) = setup().await;
        let flag = svc
            .create(SettingCreate {
                key: "MAINTENANCE_MODE".into(),
                value: Some("false".into()),
                value_type: Some(SettingType::Boolean),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(flag.value_type, SettingType::Boolean);

        // Changing only the type re-checks the stored value
        let err = svc
            .update(
                flag.id,
                SettingUpdate {
                    value_type: Some(SettingType::Number),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let bad_json = SettingCreate {
            key: "THEME".into(),
            value: Some("{not json".into()),
            value_type: Some(SettingType::Json),
            description: None,
        };
        assert!(matches!(svc.create(bad_json).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let (_pool, svc) = setup().await;
        svc.create(tax_rate("5")).await.unwrap();
        let err = svc.create(tax_rate("6")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_description_update_keeps_key_and_value() {
        let (_pool, svc) = setup().await;
        let created = svc.create(tax_rate("5")).await.unwrap();
        let updated = svc
            .update(
                created.id,
                SettingUpdate {
                    description: Some("Sales tax".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.key, GLOBAL_TAX_RATE_KEY);
        assert_eq!(updated.value.as_deref(), Some("5"));
        assert_eq!(updated.description.as_deref(), Some("Sales tax"));
        assert!(matches!(svc.get(999).await, Err(AppError::NotFound(_))));
    }
}
