use std::net::SocketAddr;

use serde::Deserialize;

use crate::{cors::CorsConfig, health::HealthConfig};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Path of the forwarding endpoint
    #[serde(default = "default_route")]
    pub route: String,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            route: default_route(),
            health: HealthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

fn default_route() -> String {
    "/api/generate-image".to_string()
}
