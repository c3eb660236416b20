//! Permission Definitions
//!
//! Two roles. Admin-only resources are listed explicitly; everything else is
//! available to any authenticated user.

use crate::utils::{AppError, AppResult};
use shared::models::{CurrentUser, Role};
use std::fmt;

/// Resources gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Categories,
    Products,
    Orders,
    OrderItems,
    Settings,
    Insights,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Users,
        Resource::Categories,
        Resource::Products,
        Resource::Orders,
        Resource::OrderItems,
        Resource::Settings,
        Resource::Insights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Orders => "orders",
            Resource::OrderItems => "order_items",
            Resource::Settings => "settings",
            Resource::Insights => "insights",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin 专属资源
pub const ADMIN_ONLY_RESOURCES: &[Resource] = &[Resource::Users, Resource::Settings, Resource::Insights];

pub fn can_access(role: Role, resource: Resource) -> bool {
    role.is_admin() || !ADMIN_ONLY_RESOURCES.contains(&resource)
}

/// Gate a call: no user is Unauthorized, the wrong role is Forbidden
pub fn require_access(user: Option<&CurrentUser>, resource: Resource) -> AppResult<()> {
    let user = user.ok_or(AppError::Unauthorized)?;
    if can_access(user.role, resource) {
        Ok(())
    } else {
        tracing::warn!(user_id = user.id, role = %user.role, %resource, "Access denied");
        Err(AppError::forbidden(format!("{} cannot access {resource}", user.role)))
    }
}
