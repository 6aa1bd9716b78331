//! # Data Models
//!
//! This module contains the SeaORM entities of the tenant directory and the
//! small response types shared by the HTTP layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod permission;
pub mod role;
pub mod role_permission;
pub mod tenant;
pub mod tenant_user;
pub mod user;
pub mod user_role;
pub mod workspace;

pub use permission::Entity as Permission;
pub use role::Entity as Role;
pub use tenant::Entity as Tenant;
pub use tenant_user::Entity as TenantUser;
pub use tenant_user::{TenantUserJoined, TenantUserRole, TenantUserStatus};
pub use user::Entity as User;
pub use workspace::Entity as Workspace;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "tenant-admin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
