//! # Role Repository
//!
//! Reference data: the permission catalog and the global roles built from it.
//! Every write here is an upsert so the seed can run repeatedly.

use crate::error::RepositoryError;
use crate::models::permission::{
    self, ActiveModel as PermissionActiveModel, Entity as Permission, Model as PermissionModel,
    PermissionAccess,
};
use crate::models::role::{self, ActiveModel as RoleActiveModel, Entity as Role, Model as RoleModel};
use crate::models::role_permission::{self, Entity as RolePermission};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Repository for Role and Permission database operations
pub struct RoleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert the `(action, entity, access)` permission unless it already exists
    pub async fn upsert_permission(
        &self,
        action: &str,
        entity: &str,
        access: PermissionAccess,
    ) -> Result<PermissionModel, RepositoryError> {
        let existing = Permission::find()
            .filter(permission::Column::Action.eq(action))
            .filter(permission::Column::Entity.eq(entity))
            .filter(permission::Column::Access.eq(access))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if let Some(permission) = existing {
            return Ok(permission);
        }

        let scope = match access {
            PermissionAccess::Own => "own",
            PermissionAccess::Any => "any",
        };

        PermissionActiveModel {
            id: Set(Uuid::new_v4()),
            action: Set(action.to_string()),
            entity: Set(entity.to_string()),
            access: Set(access),
            description: Set(format!("{action} {scope} {entity}")),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn list_permissions_by_access(
        &self,
        access: PermissionAccess,
    ) -> Result<Vec<PermissionModel>, RepositoryError> {
        Permission::find()
            .filter(permission::Column::Access.eq(access))
            .order_by_asc(permission::Column::Entity)
            .order_by_asc(permission::Column::Action)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create or update the role called `name` and replace its permission set.
    ///
    /// The role row keeps its id across calls, so existing user assignments survive.
    pub async fn upsert_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: &[Uuid],
    ) -> Result<RoleModel, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error("Role name cannot be empty"));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;
        let now = Utc::now();

        let existing = Role::find()
            .filter(role::Column::Name.eq(name))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        let role = match existing {
            Some(role) => {
                let mut active = role.into_active_model();
                active.description = Set(description.to_string());
                active.updated_at = Set(now.into());
                active.update(&txn).await
            }
            None => {
                RoleActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    description: Set(description.to_string()),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(&txn)
                .await
            }
        }
        .map_err(RepositoryError::database_error)?;

        RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role.id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        if !permission_ids.is_empty() {
            let mut unique_ids = permission_ids.to_vec();
            unique_ids.sort_unstable();
            unique_ids.dedup();

            let links = unique_ids
                .into_iter()
                .map(|permission_id| role_permission::ActiveModel {
                    role_id: Set(role.id),
                    permission_id: Set(permission_id),
                });
            RolePermission::insert_many(links)
                .exec(&txn)
                .await
                .map_err(RepositoryError::database_error)?;
        }

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(role)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleModel>, RepositoryError> {
        Role::find()
            .order_by_asc(role::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn permissions_for_role(
        &self,
        role_id: Uuid,
    ) -> Result<Vec<PermissionModel>, RepositoryError> {
        let role = Role::find_by_id(role_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Role not found"))?;

        role.find_related(Permission)
            .order_by_asc(permission::Column::Entity)
            .order_by_asc(permission::Column::Action)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
