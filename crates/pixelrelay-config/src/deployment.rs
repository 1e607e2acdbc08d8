use std::fmt;

use serde::Deserialize;

/// Deployment behavior switches
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub mode: DeploymentMode,
}

/// Whether the process runs in production
///
/// Outside production, internal failures are returned to the caller together
/// with their full cause chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DeploymentMode {
    #[default]
    Production,
    Development,
}

impl DeploymentMode {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<&str> for DeploymentMode {
    /// Only `production` (any case) selects production; every other value is
    /// treated as a development deployment
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

impl From<String> for DeploymentMode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}
