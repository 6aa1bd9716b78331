//! Migration to create the tenant_users membership table.
//!
//! A membership links one user to one tenant with an integer role, a join
//! source and a status. The `(tenant_id, user_id)` pair is unique.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantUsers::TenantId).uuid().not_null())
                    .col(ColumnDef::new(TenantUsers::UserId).uuid().not_null())
                    .col(ColumnDef::new(TenantUsers::Role).integer().not_null())
                    .col(ColumnDef::new(TenantUsers::Joined).integer().not_null())
                    .col(ColumnDef::new(TenantUsers::Status).integer().not_null())
                    .col(
                        ColumnDef::new(TenantUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TenantUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_users_tenant_id")
                            .from(TenantUsers::Table, TenantUsers::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_users_user_id")
                            .from(TenantUsers::Table, TenantUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership per (tenant, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_users_tenant_user")
                    .table(TenantUsers::Table)
                    .col(TenantUsers::TenantId)
                    .col(TenantUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_users_user_id")
                    .table(TenantUsers::Table)
                    .col(TenantUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tenant_users_tenant_user")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_tenant_users_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TenantUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantUsers {
    Table,
    Id,
    TenantId,
    UserId,
    Role,
    Joined,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
