use std::path::PathBuf;
use std::time::Duration;

use crate::aggregation::DEFAULT_SWEEP_BATCH_SIZE;

/// 服务配置 - back-office 的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | <WORK_DIR>/backoffice.db | SQLite 数据库文件 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | DB_BUSY_TIMEOUT_MS | 5000 | 写锁等待(毫秒) |
/// | TAX_SWEEP_BATCH_SIZE | 500 | 税率重算每批订单数 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 日志文件目录 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | ENVIRONMENT | development | 运行环境 |
/// | ADMIN_EMAIL | admin@example.com | 默认管理员邮箱 |
/// | ADMIN_PASSWORD | securepassword123 | 默认管理员密码 |
/// | ADMIN_NAME | Admin User | 默认管理员名称 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/backoffice TAX_SWEEP_BATCH_SIZE=1000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    pub database_path: String,
    pub db_max_connections: u32,
    pub db_busy_timeout_ms: u64,
    pub tax_sweep_batch_size: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("backoffice.db")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            work_dir,
            database_path,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            db_busy_timeout_ms: std::env::var("DB_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            tax_sweep_batch_size: std::env::var("TAX_SWEEP_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_SWEEP_BATCH_SIZE),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "securepassword123".into()),
            admin_name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, tax_sweep_batch_size: usize) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = PathBuf::from(&config.work_dir)
            .join("backoffice.db")
            .to_string_lossy()
            .into_owned();
        config.tax_sweep_batch_size = tax_sweep_batch_size.max(1);
        config
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
