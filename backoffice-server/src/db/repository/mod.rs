//! Repository Module
//!
//! SQLite CRUD as free functions over a sqlx executor. Single-statement
//! functions accept any executor (pool or open transaction); functions that
//! issue several statements take `&mut SqliteConnection` so they can only run
//! inside a caller-owned transaction.

// Auth
pub mod user;

// Catalog
pub mod category;
pub mod product;

// Orders
pub mod order;
pub mod order_item;

// System
pub mod setting;

use crate::order_money;
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() || db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Upper bound of bound ids per `IN (...)` list
pub(crate) const MAX_BIND_IDS: usize = 500;

/// Monetary value to storage cents
pub(crate) fn cents(value: Decimal, field: &str) -> RepoResult<i64> {
    order_money::to_cents(value)
        .ok_or_else(|| RepoError::Validation(format!("{field} is out of range: {value}")))
}

/// Append `(?, ?, ...)` bound to `ids`
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
