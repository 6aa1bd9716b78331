//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for the tenant directory and its reference data.

pub mod role;
pub mod tenant;
pub mod user;

pub use role::RoleRepository;
pub use tenant::{
    MembershipQuery, NewTenantUser, TenantRepository, TenantUserDetails, TenantUserWithTenant,
    TenantUserWithUser, TenantWithWorkspacesAndUsers, UpdateTenant, UpdateTenantUser,
};
pub use user::{NewUser, UserRepository};
