use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Upstream text-to-image API configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Image generation endpoint, called with POST
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,
    /// Bearer credential; takes precedence over `api_key_env`
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Environment variable holding the bearer credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-attempt request timeout (e.g. "60s"); unset means none
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout: None,
            retry: RetryConfig::default(),
        }
    }
}

impl UpstreamConfig {
    /// Resolve the credential from config, then from the environment
    ///
    /// Empty values count as unset.
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        if let Some(key) = &self.api_key
            && !key.expose_secret().is_empty()
        {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|value| !value.is_empty())
            .map(SecretString::from)
    }

    /// Parsed per-attempt timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout string is not a valid duration
    pub fn timeout_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|s| parse_duration("upstream.timeout", s))
            .transpose()
    }
}

/// Bounded retry policy for upstream calls
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed wait after a transport failure
    #[serde(default = "default_delay")]
    pub transport_delay: String,
    /// Base of the exponential wait after 429 or 5xx (base, 2×base, 4×base, ...)
    #[serde(default = "default_delay")]
    pub backoff_base: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            transport_delay: default_delay(),
            backoff_base: default_delay(),
        }
    }
}

impl RetryConfig {
    /// # Errors
    ///
    /// Returns an error if `transport_delay` is not a valid duration
    pub fn transport_delay_duration(&self) -> anyhow::Result<Duration> {
        parse_duration("upstream.retry.transport_delay", &self.transport_delay)
    }

    /// # Errors
    ///
    /// Returns an error if `backoff_base` is not a valid duration
    pub fn backoff_base_duration(&self) -> anyhow::Result<Duration> {
        parse_duration("upstream.retry.backoff_base", &self.backoff_base)
    }
}

fn parse_duration(field: &str, s: &str) -> anyhow::Result<Duration> {
    duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{s}': {e}"))
}

fn default_endpoint() -> Url {
    Url::parse("https://api.together.xyz/v1/images/generations").expect("must be valid URL")
}

fn default_api_key_env() -> String {
    "TOGETHER_API_KEY".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_retries() -> u32 {
    2
}

fn default_delay() -> String {
    "1s".to_string()
}
