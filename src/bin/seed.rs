//! Populate the database with reference roles, synthetic users and two
//! sample tenants.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tenant_admin::{
    config::ConfigLoader,
    db,
    seeds::{SeedOptions, run_seed},
    telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed the tenant directory with development data")]
struct Cli {
    /// Only upsert roles and permissions (also enabled by MINIMAL_SEED)
    #[arg(long)]
    minimal: bool,

    /// Number of synthetic users to create
    #[arg(long, value_name = "N")]
    users: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("Seeding failed: {:#}", error);
            eprintln!("Error: {:?}", error);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;

    config.minimal_seed |= cli.minimal;
    if let Some(users) = cli.users {
        config.seed_user_count = users;
    }
    config
        .validate()
        .context("validating seed options")?;

    telemetry::init_tracing(&config).context("initializing telemetry")?;

    let options = SeedOptions::from_config(&config);

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await?;

    let report = run_seed(&db, options).await.context("running seed")?;

    log::info!(
        "Seed finished: {} permissions, {} roles, {} users ({} failed), {} tenants",
        report.permissions,
        report.roles.len(),
        report.users.len(),
        report.failed_users,
        report.tenants.len()
    );

    Ok(())
}
