use serde::Deserialize;

/// Cross-origin headers stamped onto every response
///
/// The endpoint carries no caller identity, so the defaults are fully
/// permissive for origin and limited to what the endpoint accepts otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Methods listed in `Access-Control-Allow-Methods`
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    /// Headers listed in `Access-Control-Allow-Headers`
    #[serde(default = "default_headers")]
    pub headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            methods: default_methods(),
            headers: default_headers(),
        }
    }
}

impl CorsConfig {
    /// Header value for the allowed methods
    pub fn methods_value(&self) -> String {
        self.methods.join(", ")
    }

    /// Header value for the allowed request headers
    pub fn headers_value(&self) -> String {
        self.headers.join(", ")
    }
}

fn default_origin() -> String {
    "*".to_string()
}

fn default_methods() -> Vec<String> {
    vec!["POST".to_string(), "OPTIONS".to_string()]
}

fn default_headers() -> Vec<String> {
    vec!["Content-Type".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_expected_header_values() {
        let config = CorsConfig::default();
        assert_eq!(config.origin, "*");
        assert_eq!(config.methods_value(), "POST, OPTIONS");
        assert_eq!(config.headers_value(), "Content-Type");
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let config: CorsConfig = toml::from_str(r#"origin = "https://app.example""#).unwrap();
        assert_eq!(config.origin, "https://app.example");
        assert_eq!(config.methods_value(), "POST, OPTIONS");
    }
}
