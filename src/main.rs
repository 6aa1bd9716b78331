//! # Tenant Admin Main Entry Point
//!
//! This is the main entry point for the tenant directory API service.

use anyhow::{Context, Result};
use tenant_admin::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    config
        .validate_server()
        .context("validating server configuration")?;

    telemetry::init_tracing(&config).context("initializing telemetry")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await?;

    run_server(config, db).await
}
