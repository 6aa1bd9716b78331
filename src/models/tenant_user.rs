//! TenantUser entity model
//!
//! A tenant user is the membership of one [`super::user`] in one
//! [`super::tenant`]. Role, join source and status are stored as integers.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Membership of a user in a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenant_users")]
pub struct Model {
    /// Unique identifier for the membership (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant the user belongs to
    pub tenant_id: Uuid,

    /// Member identity
    pub user_id: Uuid,

    /// Role inside the tenant
    pub role: TenantUserRole,

    /// How the user came to be a member
    pub joined: TenantUserJoined,

    /// Membership lifecycle status
    pub status: TenantUserStatus,

    /// Timestamp when the membership was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the membership was last updated
    pub updated_at: DateTimeWithTimeZone,
}

/// Role a user holds inside a tenant
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantUserRole {
    #[sea_orm(num_value = 0)]
    Owner,
    #[sea_orm(num_value = 1)]
    Admin,
    #[sea_orm(num_value = 2)]
    Member,
    #[sea_orm(num_value = 3)]
    Guest,
}

impl TenantUserRole {
    /// Name of the global role that carries this membership role's permissions
    pub fn role_name(&self) -> &'static str {
        match self {
            TenantUserRole::Owner => "tenantOwner",
            TenantUserRole::Admin => "tenantAdmin",
            TenantUserRole::Member => "tenantMember",
            TenantUserRole::Guest => "tenantGuest",
        }
    }
}

/// Source of a membership
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantUserJoined {
    #[sea_orm(num_value = 0)]
    Creator,
    #[sea_orm(num_value = 1)]
    JoinedByInvitation,
    #[sea_orm(num_value = 2)]
    JoinedByLink,
    #[sea_orm(num_value = 3)]
    JoinedByPublicUrl,
}

/// Lifecycle status of a membership
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantUserStatus {
    #[sea_orm(num_value = 0)]
    PendingInvitation,
    #[sea_orm(num_value = 1)]
    Active,
    #[sea_orm(num_value = 2)]
    Inactive,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
