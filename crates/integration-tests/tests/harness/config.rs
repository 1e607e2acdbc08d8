//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use pixelrelay_config::{Config, DeploymentMode, GenerationVariant};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Point at a mock upstream with a configured credential and fast retries
    pub fn new(upstream_url: &str) -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.upstream.endpoint = upstream_url.parse().expect("valid URL");
        config.upstream.api_key = Some(SecretString::from("test-key"));
        config.upstream.retry.transport_delay = "10ms".to_owned();
        config.upstream.retry.backoff_base = "10ms".to_owned();

        Self { config }
    }

    /// Resolve the credential from an environment variable instead
    pub fn with_api_key_env(mut self, name: &str) -> Self {
        self.config.upstream.api_key = None;
        self.config.upstream.api_key_env = name.to_owned();
        self
    }

    /// Use a specific credential
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.upstream.api_key = Some(SecretString::from(key));
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.upstream.retry.max_retries = max_retries;
        self
    }

    pub fn with_variant(mut self, variant: GenerationVariant) -> Self {
        self.config.generation.variant = variant;
        self
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.config.deployment.mode = mode;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
