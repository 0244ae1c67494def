use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use clinic_api::config::AppConfig;
use clinic_api::database::repos::postgres::{
    PostgresBranchRepo, PostgresPatientRepo, PostgresTenantRepo, PostgresUserRepo,
};
use clinic_api::database::seed::seed_demo_data;
use clinic_api::database::{
    BranchRepository, PatientRepository, TenantRepository, UserRepository,
};
use clinic_api::router::create_router;
use clinic_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations/postgres")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let tenants: Arc<dyn TenantRepository> = Arc::new(PostgresTenantRepo::new(pool.clone()));
    let branches: Arc<dyn BranchRepository> = Arc::new(PostgresBranchRepo::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepo::new(pool.clone()));
    let patients: Arc<dyn PatientRepository> = Arc::new(PostgresPatientRepo::new(pool));

    seed_demo_data(
        &tenants,
        &branches,
        &users,
        &patients,
        config.security.pbkdf2_iterations,
    )
    .await
    .context("failed to seed demo data")?;

    let port = config.server.port;
    let state = Arc::new(AppState::new(config, tenants, branches, users, patients));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!("clinic-api listening on port {port}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
