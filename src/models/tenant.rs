//! Tenant entity model
//!
//! This module contains the SeaORM entity model for the tenants table,
//! the top-level customer accounts that own workspaces and memberships.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

/// Tenant entity representing a customer organization
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    /// Unique identifier for the tenant (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name for the tenant
    pub name: String,

    /// Billing provider customer reference
    pub subscription_customer_id: String,

    /// Timestamp when the tenant was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the tenant was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workspace::Entity")]
    Workspaces,
    #[sea_orm(has_many = "super::tenant_user::Entity")]
    TenantUsers,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::tenant_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
