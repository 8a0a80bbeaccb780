use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod clock;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod settings;
mod state;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    clock::SystemClock, repositories::Repositories, services::Services,
    settings::ServerSettings, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ShareIt server");

    let settings = ServerSettings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &sqlx::migrate!("./migrations")).await?;

    let services = Services::new(Repositories::postgres(pool.clone()), Arc::new(SystemClock));
    let app_state = AppState {
        db_pool: Some(pool),
        services,
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("ShareIt server listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
