//! Insights Service - record counts and revenue

use crate::auth::{Resource, require_access};
use crate::db::repository::{category, order, product, user};
use crate::utils::{AppError, AppResult};
use shared::models::{CurrentUser, DashboardStats, InsightsSummary};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct InsightsService {
    pool: SqlitePool,
}

impl InsightsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All-time summary; requires access to insights
    pub async fn summary(&self, caller: Option<&CurrentUser>) -> AppResult<InsightsSummary> {
        require_access(caller, Resource::Insights)?;
        self.compute_summary().await
    }

    /// Summary without an access check (startup tooling)
    pub async fn compute_summary(&self) -> AppResult<InsightsSummary> {
        let mut conn = self.pool.acquire().await?;
        Ok(InsightsSummary {
            total_users: user::count(&mut *conn).await?,
            total_products: product::count(&mut *conn).await?,
            total_orders: order::count(&mut *conn).await?,
            total_categories: category::count(&mut *conn).await?,
            revenue: order::sum_total(&mut *conn).await?,
            calculated_at: shared::util::now_millis(),
        })
    }

    /// Dashboard counters; the user count is only shown to admins
    pub async fn dashboard(&self, caller: Option<&CurrentUser>) -> AppResult<DashboardStats> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        let mut conn = self.pool.acquire().await?;
        let total_users = if caller.is_admin() {
            Some(user::count(&mut *conn).await?)
        } else {
            None
        };
        Ok(DashboardStats {
            role: caller.role,
            total_users,
            total_products: product::count(&mut *conn).await?,
            total_orders: order::count(&mut *conn).await?,
            total_categories: category::count(&mut *conn).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::order_money::OrderTotals;
    use rust_decimal::Decimal;
    use shared::models::{OrderCreate, Role};

    fn caller(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "ops@example.com".into(),
            name: "Ops".into(),
            role,
        }
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let db = DbService::open_in_memory().await.unwrap();
        let svc = InsightsService::new(db.pool);
        let summary = svc.summary(Some(&caller(Role::Admin))).await.unwrap();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.revenue, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_revenue_sums_order_totals() {
        let db = DbService::open_in_memory().await.unwrap();
        for subtotal in [Decimal::new(1000, 2), Decimal::new(2550, 2)] {
            let created = order::create(&db.pool, &OrderCreate::default()).await.unwrap();
            order::write_aggregates(&db.pool, created.id, &OrderTotals::levy(subtotal, Decimal::TEN))
                .await
                .unwrap();
        }
        let svc = InsightsService::new(db.pool);
        let summary = svc.summary(Some(&caller(Role::Admin))).await.unwrap();
        assert_eq!(summary.total_orders, 2);
        // 11.00 + 28.05
        assert_eq!(summary.revenue, Decimal::new(3905, 2));
    }

    #[tokio::test]
    async fn test_access_rules() {
        let db = DbService::open_in_memory().await.unwrap();
        let svc = InsightsService::new(db.pool);

        assert!(matches!(svc.summary(None).await, Err(AppError::Unauthorized)));
        assert!(matches!(
            svc.summary(Some(&caller(Role::User))).await,
            Err(AppError::Forbidden(_))
        ));

        let stats = svc.dashboard(Some(&caller(Role::User))).await.unwrap();
        assert_eq!(stats.total_users, None);
        let stats = svc.dashboard(Some(&caller(Role::Admin))).await.unwrap();
        assert_eq!(stats.total_users, Some(0));
        assert!(matches!(svc.dashboard(None).await, Err(AppError::Unauthorized)));
    }
}
