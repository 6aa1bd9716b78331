//! # User Repository
//!
//! Global user identities and their role assignments.

use crate::error::RepositoryError;
use crate::models::role::{Entity as Role, Model as RoleModel};
use crate::models::user::{self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel};
use crate::models::user_role::{self, Entity as UserRole};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Data required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: Option<String>,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a user. Duplicate email or username surfaces as `Conflict`.
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        new_user_model(new_user)?
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create a user already connected to a global role.
    ///
    /// Both rows are written in one transaction: if the role link fails no
    /// user row remains.
    pub async fn create_user_with_role(
        &self,
        new_user: NewUser,
        role_id: Uuid,
    ) -> Result<UserModel, RepositoryError> {
        let user = new_user_model(new_user)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let user = user
            .insert(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        user_role::ActiveModel {
            user_id: Set(user.id),
            role_id: Set(role_id),
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Connect a user to a global role. Assigning an existing pair is a no-op.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError> {
        let existing = UserRole::find_by_id((user_id, role_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Ok(());
        }

        user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Global roles held by a user, ordered by name
    pub async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<RoleModel>, RepositoryError> {
        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;

        user.find_related(Role)
            .order_by_asc(crate::models::role::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

fn new_user_model(new_user: NewUser) -> Result<UserActiveModel, RepositoryError> {
    if new_user.username.trim().is_empty() {
        return Err(RepositoryError::validation_error("Username cannot be empty"));
    }
    if !new_user.email.contains('@') {
        return Err(RepositoryError::validation_error(
            "Email must contain an '@' character",
        ));
    }

    let now = Utc::now();
    Ok(UserActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(new_user.email),
        username: Set(new_user.username),
        name: Set(new_user.name),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
}
