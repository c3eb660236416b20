//! 统一错误处理
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 业务错误 | E0003 资源不存在 |
//! | E2xxx | 权限错误 | E2001 无权限 |
//! | E3xxx | 认证错误 | E3001 未登录 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |
//!
//! Storage failures during an aggregate recomputation surface as
//! [`AppError::Database`]; the enclosing transaction is rolled back, so the
//! order keeps its last committed totals.

use crate::db::repository::RepoError;
use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 ==========
    #[error("Authentication required")]
    /// 未登录
    Unauthorized,

    #[error("Permission denied: {0}")]
    /// 无权限
    Forbidden(String),

    // ========== 业务逻辑错误 ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败
    Validation(String),

    // ========== 系统错误 ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (写入失败)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误
    Internal(String),
}

/// Application-level Result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable error code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "E3001",
            AppError::Forbidden(_) => "E2001",
            AppError::Validation(_) => "E0002",
            AppError::NotFound(_) => "E0003",
            AppError::Conflict(_) => "E0004",
            AppError::Internal(_) => "E9001",
            AppError::Database(_) => "E9002",
        }
    }

    /// Client errors are the caller's fault; everything else is ours
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                AppError::Database(msg)
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::from(err).into()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        AppError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}
