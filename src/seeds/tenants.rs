//! Sample tenant seeding

use std::collections::HashMap;

use rand::{Rng, distributions::Alphanumeric};
use sea_orm::DatabaseConnection;

use super::SeededTenant;
use crate::error::RepositoryError;
use crate::models::role::Model as RoleModel;
use crate::models::tenant_user::TenantUserRole;
use crate::models::user::Model as UserModel;
use crate::repositories::{NewTenantUser, TenantRepository, UserRepository};

/// A user and the role they hold in a seeded tenant
pub struct SeedMember<'a> {
    pub user: &'a UserModel,
    pub role: TenantUserRole,
}

/// Create a tenant with its workspaces and members.
///
/// Each member gets a membership row carrying `role` and is connected to the
/// matching global role from `roles`. The steps are not atomic.
pub async fn create_tenant(
    db: &DatabaseConnection,
    name: &str,
    workspace_names: &[&str],
    members: &[SeedMember<'_>],
    roles: &HashMap<TenantUserRole, RoleModel>,
) -> Result<SeededTenant, RepositoryError> {
    let tenants = TenantRepository::new(db);
    let users = UserRepository::new(db);

    let tenant = tenants
        .create_tenant(name, &subscription_customer_id())
        .await?;

    let mut workspaces = Vec::with_capacity(workspace_names.len());
    for workspace_name in workspace_names {
        workspaces.push(tenants.create_workspace(tenant.id, workspace_name).await?);
    }

    let mut memberships = Vec::with_capacity(members.len());
    for member in members {
        let role = roles.get(&member.role).ok_or_else(|| {
            RepositoryError::not_found(format!("Role '{}' not found", member.role.role_name()))
        })?;

        memberships.push(
            tenants
                .create_tenant_user(NewTenantUser {
                    tenant_id: tenant.id,
                    user_id: member.user.id,
                    role: member.role,
                })
                .await?,
        );
        users.assign_role(member.user.id, role.id).await?;

        log::info!(
            "Added '{}' to '{}' as {}",
            member.user.username,
            tenant.name,
            role.name
        );
    }

    Ok(SeededTenant {
        tenant,
        workspaces,
        memberships,
    })
}

fn subscription_customer_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(14)
        .map(char::from)
        .collect();
    format!("cus_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_ids_have_billing_prefix() {
        let id = subscription_customer_id();
        assert!(id.starts_with("cus_"));
        assert_eq!(id.len(), 18);
        assert_ne!(id, subscription_customer_id());
    }
}
