//! 认证与权限
//!
//! Password hashing and the role/resource access policy. Session handling and
//! token issuance live in the transport layer, not here.

pub mod password;
pub mod permissions;

pub use password::{hash_password, verify_password};
pub use permissions::{Resource, can_access, require_access};
