use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// The upstream credential is deliberately not required here: a missing
    /// credential is reported per request so the endpoint stays reachable.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_upstream()?;
        self.validate_generation()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if !self.server.route.starts_with('/') {
            anyhow::bail!("server.route must start with '/': `{}`", self.server.route);
        }

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': `{}`", self.server.health.path);
        }

        if self.server.health.enabled && self.server.health.path == self.server.route {
            anyhow::bail!("server.health.path and server.route must differ");
        }

        Ok(())
    }

    fn validate_upstream(&self) -> anyhow::Result<()> {
        let upstream = &self.upstream;

        if !matches!(upstream.endpoint.scheme(), "http" | "https") {
            anyhow::bail!("upstream.endpoint must be an http(s) URL: `{}`", upstream.endpoint);
        }

        if upstream.api_key_env.is_empty() {
            anyhow::bail!("upstream.api_key_env must not be empty");
        }

        upstream.timeout_duration()?;
        upstream.retry.transport_delay_duration()?;
        upstream.retry.backoff_base_duration()?;

        // 2^max_retries must stay representable as a backoff multiplier
        if upstream.retry.max_retries > 16 {
            anyhow::bail!("upstream.retry.max_retries exceeds maximum of 16");
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        let generation = &self.generation;

        for (field, value) in [
            ("width", generation.width),
            ("height", generation.height),
            ("steps", generation.steps),
            ("n", generation.n),
        ] {
            if value == Some(0) {
                anyhow::bail!("generation.{field} must be greater than 0");
            }
        }

        if generation.model.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("generation.model must not be empty");
        }

        Ok(())
    }
}
