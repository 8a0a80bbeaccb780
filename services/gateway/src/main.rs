use anyhow::Result;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod error;
mod middleware;
mod models;
mod routes;
mod settings;
mod validation;

use tokio::net::TcpListener;

use crate::{
    client::ServerClient,
    routes::{GatewayState, create_router},
    settings::GatewaySettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ShareIt gateway");

    let settings = GatewaySettings::from_env()?;
    let client = ServerClient::new(
        &settings.server_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    info!("Forwarding to {}", settings.server_url);

    let app = create_router(GatewayState { client });

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("ShareIt gateway listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
