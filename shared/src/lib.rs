//! Shared types for the e-commerce back-office
//!
//! Data models, payloads and small helpers used by the server crate and by
//! anything that talks to it. DB row derives are gated behind the `db` feature.

pub mod models;
pub mod util;

pub use models::{
    Category, CategoryCreate, CategoryUpdate, CurrentUser, DashboardStats, GLOBAL_TAX_RATE_KEY,
    InsightsSummary, Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemUpdate, OrderStatus,
    OrderUpdate, OrderWithItems, Product, ProductCreate, ProductUpdate, Role, Setting,
    SettingCreate, SettingType, SettingUpdate, User, UserCreate, UserUpdate,
};
