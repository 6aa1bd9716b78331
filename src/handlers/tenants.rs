//! # Tenants API Handlers
//!
//! Read-only directory endpoints. Every route runs behind the operator
//! authentication layer and receives the calling user's identity.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, not_found};
use crate::models::tenant::Model as TenantModel;
use crate::models::tenant_user::{TenantUserJoined, TenantUserRole, TenantUserStatus};
use crate::models::user::Model as UserModel;
use crate::models::workspace::Model as WorkspaceModel;
use crate::repositories::{
    TenantRepository, TenantUserWithTenant, TenantUserWithUser, TenantWithWorkspacesAndUsers,
};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tenant summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Tenant 1")]
    pub name: String,
    #[schema(example = "cus_Q2w3E4r5T6y7U8")]
    pub subscription_customer_id: String,
    /// ISO 8601
    #[schema(example = "2024-01-15T10:30:00+00:00")]
    pub created_at: String,
    pub updated_at: String,
}

/// Workspace belonging to a tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "T1.Workspace 1")]
    pub name: String,
    pub created_at: String,
}

/// Public user profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
}

/// Membership of a user in a tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantMemberDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub role: TenantUserRole,
    pub joined: TenantUserJoined,
    pub status: TenantUserStatus,
    pub created_at: String,
    pub user: UserDto,
}

/// Tenant with workspaces and members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantDetailsDto {
    #[serde(flatten)]
    pub tenant: TenantDto,
    pub workspaces: Vec<WorkspaceDto>,
    pub users: Vec<TenantMemberDto>,
}

/// One of the caller's memberships with its tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyMembershipDto {
    pub id: Uuid,
    pub role: TenantUserRole,
    pub joined: TenantUserJoined,
    pub status: TenantUserStatus,
    pub tenant: TenantDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantListResponse {
    pub items: Vec<TenantDetailsDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantMembersResponse {
    pub items: Vec<TenantMemberDto>,
    /// Number of memberships in the tenant
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyTenantsResponse {
    pub items: Vec<MyMembershipDto>,
}

impl From<TenantModel> for TenantDto {
    fn from(tenant: TenantModel) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            subscription_customer_id: tenant.subscription_customer_id,
            created_at: tenant.created_at.to_rfc3339(),
            updated_at: tenant.updated_at.to_rfc3339(),
        }
    }
}

impl From<WorkspaceModel> for WorkspaceDto {
    fn from(workspace: WorkspaceModel) -> Self {
        Self {
            id: workspace.id,
            tenant_id: workspace.tenant_id,
            name: workspace.name,
            created_at: workspace.created_at.to_rfc3339(),
        }
    }
}

impl From<UserModel> for UserDto {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
        }
    }
}

impl From<TenantUserWithUser> for TenantMemberDto {
    fn from(row: TenantUserWithUser) -> Self {
        let TenantUserWithUser { membership, user } = row;
        Self {
            id: membership.id,
            tenant_id: membership.tenant_id,
            role: membership.role,
            joined: membership.joined,
            status: membership.status,
            created_at: membership.created_at.to_rfc3339(),
            user: user.into(),
        }
    }
}

impl From<TenantWithWorkspacesAndUsers> for TenantDetailsDto {
    fn from(view: TenantWithWorkspacesAndUsers) -> Self {
        Self {
            tenant: view.tenant.into(),
            workspaces: view.workspaces.into_iter().map(Into::into).collect(),
            users: view.users.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<TenantUserWithTenant> for MyMembershipDto {
    fn from(row: TenantUserWithTenant) -> Self {
        Self {
            id: row.membership.id,
            role: row.membership.role,
            joined: row.membership.joined,
            status: row.membership.status,
            tenant: row.tenant.into(),
        }
    }
}

/// List every tenant with its workspaces and members
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    security(("bearer_auth" = [])),
    params(crate::auth::UserIdHeader),
    responses(
        (status = 200, description = "All tenants", body = TenantListResponse),
        (status = 400, description = "Malformed user header", body = ApiError),
        (status = 401, description = "Missing or invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<TenantListResponse>, ApiError> {
    let tenants = TenantRepository::new(&state.db).list_all_tenants().await?;
    tracing::debug!(user_id = %user.id(), count = tenants.len(), "Listed tenants");

    Ok(Json(TenantListResponse {
        items: tenants.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch a single tenant with its workspaces and members
#[utoipa::path(
    get,
    path = "/api/v1/tenants/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant identifier"),
        crate::auth::UserIdHeader
    ),
    responses(
        (status = 200, description = "Tenant found", body = TenantDetailsDto),
        (status = 401, description = "Missing or invalid credentials", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TenantDetailsDto>, ApiError> {
    let repo = TenantRepository::new(&state.db);

    let tenant = repo
        .get_tenant(id)
        .await?
        .ok_or_else(|| not_found("Tenant", id))?;
    let workspaces = repo.list_workspaces(id).await?;
    let users = repo.list_tenant_users(Some(id)).await?.unwrap_or_default();

    Ok(Json(TenantDetailsDto {
        tenant: tenant.into(),
        workspaces: workspaces.into_iter().map(Into::into).collect(),
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// List the members of a tenant
#[utoipa::path(
    get,
    path = "/api/v1/tenants/{id}/users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant identifier"),
        crate::auth::UserIdHeader
    ),
    responses(
        (status = 200, description = "Tenant members", body = TenantMembersResponse),
        (status = 401, description = "Missing or invalid credentials", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn list_tenant_users(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TenantMembersResponse>, ApiError> {
    let repo = TenantRepository::new(&state.db);

    if repo.get_tenant(id).await?.is_none() {
        return Err(not_found("Tenant", id));
    }

    let members = repo.list_tenant_users(Some(id)).await?.unwrap_or_default();
    let total = repo.count_tenant_users(id).await?;

    Ok(Json(TenantMembersResponse {
        items: members.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// List the caller's own memberships
#[utoipa::path(
    get,
    path = "/api/v1/me/tenants",
    security(("bearer_auth" = [])),
    params(crate::auth::UserIdHeader),
    responses(
        (status = 200, description = "Memberships of the calling user", body = MyTenantsResponse),
        (status = 401, description = "Missing or invalid credentials", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn list_my_tenants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MyTenantsResponse>, ApiError> {
    let memberships = TenantRepository::new(&state.db)
        .get_tenants_for_user(user.id())
        .await?;

    Ok(Json(MyTenantsResponse {
        items: memberships.into_iter().map(Into::into).collect(),
    }))
}
