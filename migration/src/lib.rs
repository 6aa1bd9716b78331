//! Database migrations for the tenant directory.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_tenants;
mod m2024_01_01_000002_create_users;
mod m2024_01_01_000003_create_workspaces;
mod m2024_01_01_000004_create_tenant_users;
mod m2024_01_01_000005_create_roles_and_permissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_tenants::Migration),
            Box::new(m2024_01_01_000002_create_users::Migration),
            Box::new(m2024_01_01_000003_create_workspaces::Migration),
            Box::new(m2024_01_01_000004_create_tenant_users::Migration),
            Box::new(m2024_01_01_000005_create_roles_and_permissions::Migration),
        ]
    }
}
