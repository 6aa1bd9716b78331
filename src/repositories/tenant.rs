//! # Tenant Repository
//!
//! This module contains the tenant directory: tenants, their workspaces and
//! the memberships (tenant users) linking global users to a tenant.
//!
//! Operations are independent statements. Creating a tenant together with its
//! workspaces and memberships is not atomic; callers compose them.

use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::models::tenant::{
    self, ActiveModel as TenantActiveModel, Entity as Tenant, Model as TenantModel,
};
use crate::models::tenant_user::{
    self, ActiveModel as TenantUserActiveModel, Entity as TenantUser, Model as TenantUserModel,
    TenantUserJoined, TenantUserRole, TenantUserStatus,
};
use crate::models::user::{Entity as User, Model as UserModel};
use crate::models::workspace::{
    self, ActiveModel as WorkspaceActiveModel, Entity as Workspace, Model as WorkspaceModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;

/// A tenant with its workspaces and members eagerly loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantWithWorkspacesAndUsers {
    #[serde(flatten)]
    pub tenant: TenantModel,
    pub workspaces: Vec<WorkspaceModel>,
    pub users: Vec<TenantUserWithUser>,
}

/// A membership row with its user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantUserWithUser {
    #[serde(flatten)]
    pub membership: TenantUserModel,
    pub user: UserModel,
}

/// A membership row with its tenant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantUserWithTenant {
    #[serde(flatten)]
    pub membership: TenantUserModel,
    pub tenant: TenantModel,
}

/// A membership row with both sides joined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantUserDetails {
    #[serde(flatten)]
    pub membership: TenantUserModel,
    pub tenant: TenantModel,
    pub user: UserModel,
}

/// Selector for [`TenantRepository::get_tenant_membership`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipQuery {
    /// Any membership of the user, in whichever tenant
    ByUser(Uuid),
    /// Any membership of the tenant
    ByTenant(Uuid),
    ByUserAndTenant { user_id: Uuid, tenant_id: Uuid },
}

impl MembershipQuery {
    fn condition(self) -> Condition {
        match self {
            MembershipQuery::ByUser(user_id) => {
                Condition::all().add(tenant_user::Column::UserId.eq(user_id))
            }
            MembershipQuery::ByTenant(tenant_id) => {
                Condition::all().add(tenant_user::Column::TenantId.eq(tenant_id))
            }
            MembershipQuery::ByUserAndTenant { user_id, tenant_id } => Condition::all()
                .add(tenant_user::Column::UserId.eq(user_id))
                .add(tenant_user::Column::TenantId.eq(tenant_id)),
        }
    }
}

/// Partial tenant update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
}

/// Partial membership update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTenantUser {
    pub role: Option<TenantUserRole>,
}

/// Data required to add a user to a tenant
#[derive(Debug, Clone)]
pub struct NewTenantUser {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: TenantUserRole,
}

/// Repository for the tenant directory
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    /// Create a new TenantRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every tenant with its workspaces and members, oldest first.
    ///
    /// Unbounded: the whole directory is loaded.
    pub async fn list_all_tenants(
        &self,
    ) -> Result<Vec<TenantWithWorkspacesAndUsers>, RepositoryError> {
        let tenants = Tenant::find()
            .order_by_asc(tenant::Column::CreatedAt)
            .order_by_asc(tenant::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if tenants.is_empty() {
            return Ok(Vec::new());
        }

        let tenant_ids: Vec<Uuid> = tenants.iter().map(|t| t.id).collect();

        let workspaces = Workspace::find()
            .filter(workspace::Column::TenantId.is_in(tenant_ids.clone()))
            .order_by_asc(workspace::Column::CreatedAt)
            .order_by_asc(workspace::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let members = TenantUser::find()
            .filter(tenant_user::Column::TenantId.is_in(tenant_ids))
            .order_by_asc(tenant_user::Column::CreatedAt)
            .order_by_asc(tenant_user::Column::Id)
            .find_also_related(User)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut workspaces_by_tenant: HashMap<Uuid, Vec<WorkspaceModel>> = HashMap::new();
        for workspace in workspaces {
            workspaces_by_tenant
                .entry(workspace.tenant_id)
                .or_default()
                .push(workspace);
        }

        let mut members_by_tenant: HashMap<Uuid, Vec<TenantUserWithUser>> = HashMap::new();
        for (membership, user) in members {
            let Some(user) = user else { continue };
            members_by_tenant
                .entry(membership.tenant_id)
                .or_default()
                .push(TenantUserWithUser { membership, user });
        }

        Ok(tenants
            .into_iter()
            .map(|tenant| TenantWithWorkspacesAndUsers {
                workspaces: workspaces_by_tenant.remove(&tenant.id).unwrap_or_default(),
                users: members_by_tenant.remove(&tenant.id).unwrap_or_default(),
                tenant,
            })
            .collect())
    }

    /// Get tenant by ID
    pub async fn get_tenant(&self, id: Uuid) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every membership of a user, each with its tenant
    pub async fn get_tenants_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TenantUserWithTenant>, RepositoryError> {
        let rows = TenantUser::find()
            .filter(tenant_user::Column::UserId.eq(user_id))
            .order_by_asc(tenant_user::Column::CreatedAt)
            .order_by_asc(tenant_user::Column::Id)
            .find_also_related(Tenant)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, tenant)| {
                tenant.map(|tenant| TenantUserWithTenant { membership, tenant })
            })
            .collect())
    }

    pub async fn count_tenant_users(&self, tenant_id: Uuid) -> Result<u64, RepositoryError> {
        TenantUser::find()
            .filter(tenant_user::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Members of a tenant with their users.
    ///
    /// Returns `Ok(None)` when no tenant id is given, which is distinct from a
    /// tenant without members.
    pub async fn list_tenant_users(
        &self,
        tenant_id: Option<Uuid>,
    ) -> Result<Option<Vec<TenantUserWithUser>>, RepositoryError> {
        let Some(tenant_id) = tenant_id else {
            return Ok(None);
        };

        let rows = TenantUser::find()
            .filter(tenant_user::Column::TenantId.eq(tenant_id))
            .order_by_asc(tenant_user::Column::CreatedAt)
            .order_by_asc(tenant_user::Column::Id)
            .find_also_related(User)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(Some(
            rows.into_iter()
                .filter_map(|(membership, user)| {
                    user.map(|user| TenantUserWithUser { membership, user })
                })
                .collect(),
        ))
    }

    pub async fn get_tenant_user(
        &self,
        id: Uuid,
    ) -> Result<Option<TenantUserDetails>, RepositoryError> {
        let membership = TenantUser::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        match membership {
            Some(membership) => self.with_details(membership).await,
            None => Ok(None),
        }
    }

    /// First membership matching `query`, oldest first
    pub async fn get_tenant_membership(
        &self,
        query: MembershipQuery,
    ) -> Result<Option<TenantUserDetails>, RepositoryError> {
        let membership = TenantUser::find()
            .filter(query.condition())
            .order_by_asc(tenant_user::Column::CreatedAt)
            .order_by_asc(tenant_user::Column::Id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        match membership {
            Some(membership) => self.with_details(membership).await,
            None => Ok(None),
        }
    }

    pub async fn update_tenant(
        &self,
        id: Uuid,
        update: UpdateTenant,
    ) -> Result<TenantModel, RepositoryError> {
        let tenant = self
            .get_tenant(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Tenant not found"))?;

        let mut active_tenant = tenant.into_active_model();
        if let Some(name) = update.name {
            validate_name("Tenant name", &name)?;
            active_tenant.name = Set(name);
        }
        active_tenant.updated_at = Set(Utc::now().into());

        active_tenant
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_tenant_user(
        &self,
        id: Uuid,
        update: UpdateTenantUser,
    ) -> Result<TenantUserModel, RepositoryError> {
        let membership = TenantUser::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Tenant user not found"))?;

        let mut active_membership = membership.into_active_model();
        if let Some(role) = update.role {
            active_membership.role = Set(role);
        }
        active_membership.updated_at = Set(Utc::now().into());

        active_membership
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create a tenant. Names need not be unique.
    pub async fn create_tenant(
        &self,
        name: &str,
        subscription_customer_id: &str,
    ) -> Result<TenantModel, RepositoryError> {
        validate_name("Tenant name", name)?;

        let now = Utc::now();
        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            subscription_customer_id: Set(subscription_customer_id.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Add a user to a tenant.
    ///
    /// The membership is always recorded as joined by invitation and active.
    /// A second membership for the same user and tenant is a `Conflict`.
    pub async fn create_tenant_user(
        &self,
        new_member: NewTenantUser,
    ) -> Result<TenantUserModel, RepositoryError> {
        let now = Utc::now();
        let membership = TenantUserActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(new_member.tenant_id),
            user_id: Set(new_member.user_id),
            role: Set(new_member.role),
            joined: Set(TenantUserJoined::JoinedByInvitation),
            status: Set(TenantUserStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        membership
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete_tenant_user(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = TenantUser::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Tenant user not found"));
        }

        Ok(())
    }

    /// Delete a tenant; its workspaces and memberships go with it
    pub async fn delete_tenant(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = Tenant::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Tenant not found"));
        }

        Ok(())
    }

    pub async fn create_workspace(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> Result<WorkspaceModel, RepositoryError> {
        validate_name("Workspace name", name)?;

        if self.get_tenant(tenant_id).await?.is_none() {
            return Err(RepositoryError::not_found("Tenant not found"));
        }

        let now = Utc::now();
        let workspace = WorkspaceActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        workspace
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_workspaces(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<WorkspaceModel>, RepositoryError> {
        Workspace::find()
            .filter(workspace::Column::TenantId.eq(tenant_id))
            .order_by_asc(workspace::Column::CreatedAt)
            .order_by_asc(workspace::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn with_details(
        &self,
        membership: TenantUserModel,
    ) -> Result<Option<TenantUserDetails>, RepositoryError> {
        let tenant = membership
            .find_related(Tenant)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        let user = membership
            .find_related(User)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(match (tenant, user) {
            (Some(tenant), Some(user)) => Some(TenantUserDetails {
                membership,
                tenant,
                user,
            }),
            _ => None,
        })
    }
}

fn validate_name(label: &str, name: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error(format!(
            "{label} cannot be empty"
        )));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(RepositoryError::validation_error(format!(
            "{label} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    Ok(())
}
