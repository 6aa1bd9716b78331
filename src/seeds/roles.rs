//! Permission catalog and role seeding
//!
//! The catalog is every `action` on every `entity` at both access levels. Roles
//! are upserted by name, so re-running keeps one row per role and existing
//! user assignments stay attached.

use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::permission::PermissionAccess;
use crate::models::role::Model as RoleModel;
use crate::models::tenant_user::TenantUserRole;
use crate::repositories::RoleRepository;

pub const PERMISSION_ENTITIES: [&str; 4] = ["user", "tenant", "workspace", "member"];
pub const PERMISSION_ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];

pub const ADMIN_ROLE: &str = "admin";
pub const TENANT_ROLE: &str = "tenant";

pub const TENANT_MEMBERSHIP_ROLES: [TenantUserRole; 4] = [
    TenantUserRole::Owner,
    TenantUserRole::Admin,
    TenantUserRole::Member,
    TenantUserRole::Guest,
];

/// Upsert the full permission catalog, returning how many entries it holds
pub async fn seed_permissions(db: &DatabaseConnection) -> Result<usize, RepositoryError> {
    let repo = RoleRepository::new(db);
    let mut count = 0;

    for entity in PERMISSION_ENTITIES {
        for action in PERMISSION_ACTIONS {
            for access in [PermissionAccess::Own, PermissionAccess::Any] {
                repo.upsert_permission(action, entity, access).await?;
                count += 1;
            }
        }
    }

    log::info!("Permission catalog holds {} entries", count);
    Ok(count)
}

/// Upsert the global `admin` (every `any` permission) and `tenant` (every
/// `own` permission) roles. Returns the `tenant` role.
pub async fn seed_base_roles(db: &DatabaseConnection) -> Result<RoleModel, RepositoryError> {
    let repo = RoleRepository::new(db);

    let any_ids = permission_ids(&repo, PermissionAccess::Any).await?;
    repo.upsert_role(ADMIN_ROLE, "Administrator", &any_ids)
        .await?;

    let own_ids = permission_ids(&repo, PermissionAccess::Own).await?;
    let tenant_role = repo
        .upsert_role(TENANT_ROLE, "Tenant user", &own_ids)
        .await?;

    log::info!(
        "Upserted roles '{}' ({} permissions) and '{}' ({} permissions)",
        ADMIN_ROLE,
        any_ids.len(),
        TENANT_ROLE,
        own_ids.len()
    );
    Ok(tenant_role)
}

/// Upsert `tenantOwner`, `tenantAdmin`, `tenantMember` and `tenantGuest`, each
/// with every `own` permission, keyed by the membership role they mirror.
pub async fn seed_tenant_roles(
    db: &DatabaseConnection,
) -> Result<HashMap<TenantUserRole, RoleModel>, RepositoryError> {
    let repo = RoleRepository::new(db);
    let own_ids = permission_ids(&repo, PermissionAccess::Own).await?;

    let mut roles = HashMap::new();
    for membership_role in TENANT_MEMBERSHIP_ROLES {
        let name = membership_role.role_name();
        let role = repo
            .upsert_role(name, &format!("Tenant role {name}"), &own_ids)
            .await?;
        log::debug!("Upserted role '{}'", name);
        roles.insert(membership_role, role);
    }

    Ok(roles)
}

async fn permission_ids(
    repo: &RoleRepository<'_>,
    access: PermissionAccess,
) -> Result<Vec<Uuid>, RepositoryError> {
    Ok(repo
        .list_permissions_by_access(access)
        .await?
        .into_iter()
        .map(|permission| permission.id)
        .collect())
}
