//! Test utilities for database testing.
//!
//! In-memory SQLite databases with migrations applied. Foreign keys stay
//! enforced so cascade behaviour matches Postgres.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tenant_admin::config::AppConfig;
use tenant_admin::models::tenant::Model as TenantModel;
use tenant_admin::models::tenant_user::{Model as TenantUserModel, TenantUserRole};
use tenant_admin::models::user::Model as UserModel;
use tenant_admin::repositories::{NewTenantUser, NewUser, TenantRepository, UserRepository};
use tenant_admin::server::AppState;

pub const TEST_OPERATOR_TOKEN: &str = "test-operator-token";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        operator_tokens: vec![TEST_OPERATOR_TOKEN.to_string()],
        ..Default::default()
    }
}

pub async fn create_test_app_state() -> Result<AppState> {
    Ok(AppState {
        config: Arc::new(test_config()),
        db: setup_test_db().await?,
    })
}

pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<UserModel> {
    Ok(UserRepository::new(db)
        .create_user(NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            name: Some(username.to_string()),
        })
        .await?)
}

pub async fn create_test_tenant(db: &DatabaseConnection, name: &str) -> Result<TenantModel> {
    Ok(TenantRepository::new(db)
        .create_tenant(name, "cus_test")
        .await?)
}

pub async fn add_member(
    db: &DatabaseConnection,
    tenant: &TenantModel,
    user: &UserModel,
    role: TenantUserRole,
) -> Result<TenantUserModel> {
    Ok(TenantRepository::new(db)
        .create_tenant_user(NewTenantUser {
            tenant_id: tenant.id,
            user_id: user.id,
            role,
        })
        .await?)
}
