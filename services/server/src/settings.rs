//! Server settings loaded from `SERVER_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Listener settings for the server binary
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_address: String,
}

impl ServerSettings {
    /// Read settings, `SERVER_BIND_ADDRESS` overriding the default listener
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:9090")?
            .add_source(Environment::with_prefix("SERVER"))
            .build()?
            .try_deserialize()
    }
}
