//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// URL-friendly unique identifier
    pub slug: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
}
