//! Data models
//!
//! Shared between the back-office server and its callers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Monetary fields are `Decimal` with two fractional digits; the server
//! stores them as integer cents and converts at the repository boundary.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod insights;
pub mod order;
pub mod order_item;
pub mod product;
pub mod setting;
pub mod user;

// Re-exports
pub use category::*;
pub use insights::*;
pub use order::*;
pub use order_item::*;
pub use product::*;
pub use setting::*;
pub use user::*;
