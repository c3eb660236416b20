//! 业务服务
//!
//! Domain services over the repositories. Services that change order items or
//! the tax rate share one [`crate::aggregation::AggregationEngine`].

pub mod catalog;
pub mod insights;
pub mod orders;
pub mod settings;
pub mod users;

pub use catalog::CatalogService;
pub use insights::InsightsService;
pub use orders::OrderService;
pub use settings::SettingsService;
pub use users::UserService;
