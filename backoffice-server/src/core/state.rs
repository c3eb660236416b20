use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregation::AggregationEngine;
use crate::core::Config;
use crate::db::DbService;
use crate::services::{CatalogService, InsightsService, OrderService, SettingsService, UserService};
use crate::utils::AppResult;

/// 服务状态 - 持有连接池和所有业务服务
///
/// 所有服务共享同一个 [`AggregationEngine`]，税率重算因此在进程内串行。
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub engine: Arc<AggregationEngine>,
    pub users: UserService,
    pub catalog: CatalogService,
    pub settings: SettingsService,
    pub orders: OrderService,
    pub insights: InsightsService,
}

impl ServerState {
    /// Wire the services around an open database
    pub fn new(config: Config, db: DbService) -> Self {
        let pool = db.pool.clone();
        let engine = Arc::new(AggregationEngine::with_settings_rate(
            pool.clone(),
            config.tax_sweep_batch_size,
        ));
        Self {
            users: UserService::new(pool.clone()),
            catalog: CatalogService::new(pool.clone()),
            settings: SettingsService::new(pool.clone(), engine.clone()),
            orders: OrderService::new(pool.clone(), engine.clone()),
            insights: InsightsService::new(pool),
            engine,
            config,
            db,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建工作目录, 打开数据库并执行迁移
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if let Some(parent) = PathBuf::from(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::utils::AppError::internal(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = DbService::new(
            &config.database_path,
            config.db_max_connections,
            config.busy_timeout(),
        )
        .await?;
        Ok(Self::new(config.clone(), db))
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderCreate, OrderItemCreate, ProductCreate, SettingCreate, SettingType};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_initialize_wires_shared_engine() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().join("nested").to_string_lossy(), 10);
        let state = ServerState::initialize(&config).await.unwrap();
        assert!(state.work_dir().ends_with("nested"));

        let product = state
            .catalog
            .create_product(ProductCreate {
                name: "Lamp".into(),
                description: None,
                price: Decimal::new(4000, 2),
                stock: Some(3),
                sku: None,
                image_url: None,
                is_active: None,
                category_id: None,
            })
            .await
            .unwrap();
        let order = state.orders.create_order(OrderCreate::default()).await.unwrap();
        state
            .orders
            .add_item(OrderItemCreate {
                order_id: order.id,
                product_id: product.id,
                quantity: 1,
                unit_price: None,
                line_total: None,
            })
            .await
            .unwrap();

        state
            .settings
            .create(SettingCreate {
                key: shared::models::GLOBAL_TAX_RATE_KEY.into(),
                value: Some("25".into()),
                value_type: Some(SettingType::Number),
                description: None,
            })
            .await
            .unwrap();

        let order = state.orders.get_order(order.id).await.unwrap();
        assert_eq!(order.tax_amount, Decimal::new(1000, 2));
        assert_eq!(order.total_amount, Decimal::new(5000, 2));
    }
}
