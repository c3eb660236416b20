//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current list price (2dp). Line items copy it at creation time.
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    /// Category reference
    pub category_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub sku: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub sku: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<i64>,
}
