//! # Server Configuration
//!
//! This module contains the router and server setup for the tenant directory API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, middleware, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/v1/tenants", get(handlers::tenants::list_tenants))
        .route("/v1/tenants/{id}", get(handlers::tenants::get_tenant))
        .route(
            "/v1/tenants/{id}/users",
            get(handlers::tenants::list_tenant_users),
        )
        .route("/v1/me/tenants", get(handlers::tenants::list_my_tenants))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> Result<()> {
    let addr = config.bind_addr().context("Invalid server address")?;
    let profile = config.profile.clone();

    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::tenants::list_tenants,
        crate::handlers::tenants::get_tenant,
        crate::handlers::tenants::list_tenant_users,
        crate::handlers::tenants::list_my_tenants,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::tenants::TenantDto,
            crate::handlers::tenants::WorkspaceDto,
            crate::handlers::tenants::UserDto,
            crate::handlers::tenants::TenantMemberDto,
            crate::handlers::tenants::TenantDetailsDto,
            crate::handlers::tenants::MyMembershipDto,
            crate::handlers::tenants::TenantListResponse,
            crate::handlers::tenants::TenantMembersResponse,
            crate::handlers::tenants::MyTenantsResponse,
            crate::models::TenantUserRole,
            crate::models::TenantUserJoined,
            crate::models::TenantUserStatus,
            crate::error::ApiError,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "root", description = "Service metadata"),
        (name = "tenants", description = "Tenant directory")
    ),
    info(
        title = "Tenant Admin API",
        description = "Tenants, workspaces and memberships",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
