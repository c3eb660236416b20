//! Back-office server - 电商后台数据层
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx) 连接池、迁移和仓储
//! - **聚合** (`aggregation`): 订单小计/税额/总额的重算引擎
//! - **服务** (`services`): 用户、目录、设置、订单、统计
//! - **认证** (`auth`): Argon2 密码和角色权限
//! - **金额** (`order_money`): Decimal 金额计算与舍入
//!
//! # 模块结构
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # 配置、状态
//! ├── auth/          # 密码、权限
//! ├── aggregation/   # 订单聚合引擎
//! ├── services/      # 业务服务
//! ├── order_money/   # 金额计算
//! ├── utils/         # 错误、日志、校验
//! └── db/            # 连接池、迁移、仓储
//! ```

pub mod aggregation;
pub mod auth;
pub mod core;
pub mod db;
pub mod order_money;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use aggregation::{AggregateEvent, AggregationEngine, TaxRateSource};
pub use crate::core::{Config, ServerState};
pub use db::DbService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env, 创建工作目录, 初始化日志
pub fn setup_environment() -> Result<Config, AppError> {
    // .env is optional
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir).map_err(|e| {
        AppError::internal(format!("Failed to create work dir {}: {e}", config.work_dir))
    })?;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| AppError::internal(format!("Failed to create log dir {log_dir}: {e}")))?;
    }

    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    Ok(config)
}
