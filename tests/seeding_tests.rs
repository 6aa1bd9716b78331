//! Seed generator tests against an in-memory database.

#[path = "test_utils/mod.rs"]
mod test_utils;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tenant_admin::models::{
    Permission, Role, Tenant, TenantUser, TenantUserRole, Workspace, permission, role,
};
use tenant_admin::repositories::{RoleRepository, TenantRepository, UserRepository};
use tenant_admin::seeds::{SeedError, SeedOptions, run_seed};
use test_utils::setup_test_db;

fn full() -> SeedOptions {
    SeedOptions {
        minimal: false,
        user_count: 5,
    }
}

fn minimal() -> SeedOptions {
    SeedOptions {
        minimal: true,
        user_count: 5,
    }
}

#[tokio::test]
async fn minimal_seed_creates_roles_only() {
    let db = setup_test_db().await.unwrap();

    let report = run_seed(&db, minimal()).await.unwrap();

    assert!(report.minimal);
    assert_eq!(report.permissions, 32);
    assert_eq!(report.roles, vec!["admin", "tenant"]);
    assert!(report.users.is_empty());
    assert!(report.tenants.is_empty());

    assert_eq!(Permission::find().count(&db).await.unwrap(), 32);
    assert_eq!(Role::find().count(&db).await.unwrap(), 2);
    assert_eq!(Tenant::find().count(&db).await.unwrap(), 0);
    assert_eq!(
        tenant_admin::models::User::find().count(&db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn base_roles_carry_access_scoped_permissions() {
    let db = setup_test_db().await.unwrap();
    run_seed(&db, minimal()).await.unwrap();

    let roles = RoleRepository::new(&db);
    let admin = roles.find_by_name("admin").await.unwrap().unwrap();
    let tenant = roles.find_by_name("tenant").await.unwrap().unwrap();

    let admin_permissions = roles.permissions_for_role(admin.id).await.unwrap();
    assert_eq!(admin_permissions.len(), 16);
    assert!(
        admin_permissions
            .iter()
            .all(|p| p.access == permission::PermissionAccess::Any)
    );

    let tenant_permissions = roles.permissions_for_role(tenant.id).await.unwrap();
    assert_eq!(tenant_permissions.len(), 16);
    assert!(
        tenant_permissions
            .iter()
            .all(|p| p.access == permission::PermissionAccess::Own)
    );
}

#[tokio::test]
async fn seeding_twice_keeps_one_row_per_role() {
    let db = setup_test_db().await.unwrap();

    run_seed(&db, full()).await.unwrap();
    let tenant_role_before = RoleRepository::new(&db)
        .find_by_name("tenant")
        .await
        .unwrap()
        .unwrap();

    run_seed(&db, full()).await.unwrap();

    for name in [
        "admin",
        "tenant",
        "tenantOwner",
        "tenantAdmin",
        "tenantMember",
        "tenantGuest",
    ] {
        let count = Role::find()
            .filter(role::Column::Name.eq(name))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1, "role {name}");
    }
    assert_eq!(Permission::find().count(&db).await.unwrap(), 32);

    // The role keeps its id, so users from the first run stay attached
    let tenant_role_after = RoleRepository::new(&db)
        .find_by_name("tenant")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant_role_before.id, tenant_role_after.id);

    // Users and tenants are created afresh on every full run
    assert_eq!(
        tenant_admin::models::User::find().count(&db).await.unwrap(),
        10
    );
    assert_eq!(Tenant::find().count(&db).await.unwrap(), 4);
}

#[tokio::test]
async fn full_seed_builds_sample_tenants() {
    let db = setup_test_db().await.unwrap();

    let report = run_seed(&db, full()).await.unwrap();

    assert_eq!(report.users.len(), 5);
    assert_eq!(report.failed_users, 0);
    assert_eq!(report.tenants.len(), 2);
    assert_eq!(Workspace::find().count(&db).await.unwrap(), 4);
    assert_eq!(TenantUser::find().count(&db).await.unwrap(), 5);

    let admin = &report.users[0];
    let owner = &report.users[1];
    let member = &report.users[2];

    let first = &report.tenants[0];
    assert_eq!(first.tenant.name, "Tenant 1");
    let names: Vec<&str> = first.workspaces.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["T1.Workspace 1", "T1.Workspace 2"]);
    let roles: Vec<(uuid::Uuid, TenantUserRole)> = first
        .memberships
        .iter()
        .map(|m| (m.user_id, m.role))
        .collect();
    assert_eq!(
        roles,
        vec![
            (owner.id, TenantUserRole::Owner),
            (admin.id, TenantUserRole::Admin),
            (member.id, TenantUserRole::Member),
        ]
    );

    let second = &report.tenants[1];
    assert_eq!(second.tenant.name, "Tenant 2");
    let names: Vec<&str> = second.workspaces.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["T2.Workspace 1", "T2.Workspace 2"]);
    let roles: Vec<(uuid::Uuid, TenantUserRole)> = second
        .memberships
        .iter()
        .map(|m| (m.user_id, m.role))
        .collect();
    assert_eq!(
        roles,
        vec![
            (admin.id, TenantUserRole::Owner),
            (member.id, TenantUserRole::Member),
        ]
    );

    assert!(
        report
            .tenants
            .iter()
            .all(|t| t.tenant.subscription_customer_id.starts_with("cus_"))
    );
}

#[tokio::test]
async fn seeded_users_hold_matching_global_roles() {
    let db = setup_test_db().await.unwrap();
    let report = run_seed(&db, full()).await.unwrap();
    let users = UserRepository::new(&db);

    let role_names = |roles: Vec<tenant_admin::models::role::Model>| {
        roles.into_iter().map(|r| r.name).collect::<Vec<_>>()
    };

    // admin: tenantAdmin in Tenant 1, tenantOwner in Tenant 2
    let admin_roles = role_names(users.roles_for_user(report.users[0].id).await.unwrap());
    assert_eq!(admin_roles, vec!["tenant", "tenantAdmin", "tenantOwner"]);

    let member_roles = role_names(users.roles_for_user(report.users[2].id).await.unwrap());
    assert_eq!(member_roles, vec!["tenant", "tenantMember"]);

    let bystander_roles = role_names(users.roles_for_user(report.users[4].id).await.unwrap());
    assert_eq!(bystander_roles, vec!["tenant"]);
}

#[tokio::test]
async fn seeded_memberships_are_active_invitations() {
    let db = setup_test_db().await.unwrap();
    run_seed(&db, full()).await.unwrap();

    let all = TenantRepository::new(&db).list_all_tenants().await.unwrap();
    assert_eq!(all.len(), 2);
    for view in all {
        for member in view.users {
            assert_eq!(
                member.membership.joined,
                tenant_admin::models::TenantUserJoined::JoinedByInvitation
            );
            assert_eq!(
                member.membership.status,
                tenant_admin::models::TenantUserStatus::Active
            );
        }
    }
}

#[tokio::test]
async fn too_few_users_is_missing_user_error_before_tenants() {
    let db = setup_test_db().await.unwrap();

    let result = run_seed(
        &db,
        SeedOptions {
            minimal: false,
            user_count: 2,
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(SeedError::MissingUser { index: 2, .. })
    ));
    assert_eq!(Tenant::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_optional_user_is_counted_and_seed_continues() {
    let db = setup_test_db().await.unwrap();

    // Synthetic usernames end in "{index}{6 char suffix}"; reject index 4.
    db.execute_unprepared(
        "CREATE TRIGGER reject_fifth_seed_user BEFORE INSERT ON users \
         WHEN NEW.username GLOB '*4??????' \
         BEGIN SELECT RAISE(ABORT, 'user rejected'); END;",
    )
    .await
    .unwrap();

    let report = run_seed(&db, full()).await.unwrap();

    assert_eq!(report.failed_users, 1);
    assert_eq!(report.users.len(), 4);
    assert_eq!(report.tenants.len(), 2);
    assert_eq!(
        tenant_admin::models::User::find().count(&db).await.unwrap(),
        4
    );
}
