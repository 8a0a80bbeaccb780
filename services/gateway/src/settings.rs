//! Gateway settings loaded from `GATEWAY_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    pub bind_address: String,
    /// Base URL of the ShareIt server requests are forwarded to
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl GatewaySettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("server_url", "http://localhost:9090")?
            .set_default("request_timeout_secs", 10)?
            .add_source(Environment::with_prefix("GATEWAY").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
