use anyhow::Context;
use backoffice_server::{ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    let config = setup_environment().context("failed to set up environment")?;

    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        "Back-office maintenance starting"
    );

    // 2. 打开数据库, 执行迁移
    let state = ServerState::initialize(&config)
        .await
        .context("failed to open database")?;

    // 3. 默认管理员
    let created = state
        .users
        .ensure_default_admin(&config.admin_email, &config.admin_password, &config.admin_name)
        .await
        .context("failed to ensure default admin")?;
    if created && config.is_production() {
        tracing::warn!(email = %config.admin_email, "Default admin created, change its password");
    }

    // 4. 校正订单聚合字段
    let report = state
        .engine
        .reconcile_all()
        .await
        .context("failed to reconcile order aggregates")?;
    if report.corrected > 0 {
        tracing::warn!(corrected = report.corrected, "Order aggregates were out of date");
    }

    // 5. 统计摘要
    let summary = state
        .insights
        .compute_summary()
        .await
        .context("failed to compute insights")?;
    let calculated_at = chrono::DateTime::from_timestamp_millis(summary.calculated_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    tracing::info!(
        users = summary.total_users,
        products = summary.total_products,
        orders = summary.total_orders,
        categories = summary.total_categories,
        revenue = %summary.revenue,
        %calculated_at,
        "Insights summary"
    );

    state.db.pool.close().await;
    Ok(())
}
