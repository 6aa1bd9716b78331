//! Database seeding functionality
//!
//! Populates reference roles and permissions, synthetic users and two sample
//! tenants with workspaces and role-tagged memberships.

use std::time::Instant;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::RepositoryError;
use crate::models::tenant::Model as TenantModel;
use crate::models::tenant_user::{Model as TenantUserModel, TenantUserRole};
use crate::models::user::Model as UserModel;
use crate::models::workspace::Model as WorkspaceModel;

pub mod roles;
pub mod tenants;
pub mod users;

use tenants::SeedMember;

const OWNER_INDEX: usize = 1;
const ADMIN_INDEX: usize = 0;
const MEMBER_INDEX: usize = 2;

/// Errors that abort or degrade a seed run
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to create user '{username}': {source}")]
    UserCreation {
        username: String,
        #[source]
        source: RepositoryError,
    },
    #[error("user creation task {index} did not complete")]
    TaskAborted { index: usize },
    #[error("required {role} user (index {index}) was not created")]
    MissingUser { index: usize, role: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What a seed run should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Stop after reference roles and permissions
    pub minimal: bool,
    pub user_count: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            minimal: false,
            user_count: 5,
        }
    }
}

impl SeedOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            minimal: config.minimal_seed,
            user_count: config.seed_user_count,
        }
    }
}

/// A tenant created by the seed together with its children
#[derive(Debug, Clone)]
pub struct SeededTenant {
    pub tenant: TenantModel,
    pub workspaces: Vec<WorkspaceModel>,
    pub memberships: Vec<TenantUserModel>,
}

/// Summary of a seed run
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub minimal: bool,
    pub permissions: usize,
    pub roles: Vec<String>,
    pub users: Vec<UserModel>,
    pub failed_users: usize,
    pub tenants: Vec<SeededTenant>,
}

/// Seed the database.
///
/// Roles and permissions are upserted and safe to repeat. Every full run
/// creates fresh users and a fresh "Tenant 1" and "Tenant 2".
pub async fn run_seed(
    db: &DatabaseConnection,
    options: SeedOptions,
) -> Result<SeedReport, SeedError> {
    let started = Instant::now();
    log::info!("Seeding tenants...");

    let mut report = SeedReport {
        minimal: options.minimal,
        ..Default::default()
    };

    let step = Instant::now();
    report.permissions = roles::seed_permissions(db).await?;
    let tenant_role = roles::seed_base_roles(db).await?;
    report.roles.push(roles::ADMIN_ROLE.to_string());
    report.roles.push(roles::TENANT_ROLE.to_string());
    log::info!("Created tenant role in {:?}", step.elapsed());

    if options.minimal {
        log::info!("Minimal seed complete in {:?}", started.elapsed());
        return Ok(report);
    }

    let step = Instant::now();
    let outcomes = users::create_users(db, tenant_role.id, options.user_count).await;
    let users: Vec<Option<UserModel>> = outcomes.into_iter().map(Result::ok).collect();
    report.failed_users = users.iter().filter(|user| user.is_none()).count();
    report.users = users.iter().flatten().cloned().collect();
    log::info!(
        "Created {} of {} tenant users in {:?}",
        report.users.len(),
        options.user_count,
        step.elapsed()
    );

    let owner = required_user(&users, OWNER_INDEX, "tenantOwner")?;
    let admin = required_user(&users, ADMIN_INDEX, "tenantAdmin")?;
    let member = required_user(&users, MEMBER_INDEX, "tenantMember")?;
    log::info!("tenantOwner: {}", owner.username);
    log::info!("tenantAdmin: {}", admin.username);
    log::info!("tenantMember: {}", member.username);

    let step = Instant::now();
    let tenant_roles = roles::seed_tenant_roles(db).await?;
    report.roles.extend(
        roles::TENANT_MEMBERSHIP_ROLES
            .iter()
            .map(|role| role.role_name().to_string()),
    );
    log::info!("Upserted tenant roles in {:?}", step.elapsed());

    let step = Instant::now();
    let first = tenants::create_tenant(
        db,
        "Tenant 1",
        &["T1.Workspace 1", "T1.Workspace 2"],
        &[
            SeedMember {
                user: owner,
                role: TenantUserRole::Owner,
            },
            SeedMember {
                user: admin,
                role: TenantUserRole::Admin,
            },
            SeedMember {
                user: member,
                role: TenantUserRole::Member,
            },
        ],
        &tenant_roles,
    )
    .await?;
    log::info!(
        "Created Tenant 1 & workspaces T1.Workspace 1, T1.Workspace 2 in {:?}",
        step.elapsed()
    );
    report.tenants.push(first);

    let step = Instant::now();
    let second = tenants::create_tenant(
        db,
        "Tenant 2",
        &["T2.Workspace 1", "T2.Workspace 2"],
        &[
            SeedMember {
                user: admin,
                role: TenantUserRole::Owner,
            },
            SeedMember {
                user: member,
                role: TenantUserRole::Member,
            },
        ],
        &tenant_roles,
    )
    .await?;
    log::info!(
        "Created Tenant 2 & workspaces T2.Workspace 1, T2.Workspace 2 in {:?}",
        step.elapsed()
    );
    report.tenants.push(second);

    log::info!("Database has been seeded in {:?}", started.elapsed());
    Ok(report)
}

fn required_user<'a>(
    users: &'a [Option<UserModel>],
    index: usize,
    role: &'static str,
) -> Result<&'a UserModel, SeedError> {
    users
        .get(index)
        .and_then(Option::as_ref)
        .ok_or(SeedError::MissingUser { index, role })
}
