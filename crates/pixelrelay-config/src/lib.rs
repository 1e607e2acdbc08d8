#![allow(clippy::must_use_candidate)]

pub mod cors;
pub mod deployment;
mod env;
pub mod generation;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod upstream;

use serde::Deserialize;

pub use cors::*;
pub use deployment::*;
pub use env::ExpandError;
pub use generation::*;
pub use health::*;
pub use server::*;
pub use telemetry::*;
pub use upstream::*;

/// Top-level pixelrelay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener, routes and response headers
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream image generation API
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Fixed options merged into every upstream request
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Production or development behavior
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
