use anyhow::Context;
use http::{
    HeaderValue,
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HeaderName},
};
use pixelrelay_config::CorsConfig;
use tower_http::set_header::SetResponseHeaderLayer;

/// Cross-origin headers added to every response, in a fixed order
///
/// # Errors
///
/// Returns an error if a configured value is not a valid header value
pub fn cors_headers(config: &CorsConfig) -> anyhow::Result<Vec<(HeaderName, HeaderValue)>> {
    let origin = HeaderValue::from_str(&config.origin).context("invalid server.cors.origin")?;
    let methods = HeaderValue::from_str(&config.methods_value()).context("invalid server.cors.methods")?;
    let headers = HeaderValue::from_str(&config.headers_value()).context("invalid server.cors.headers")?;

    Ok(vec![
        (ACCESS_CONTROL_ALLOW_ORIGIN, origin),
        (ACCESS_CONTROL_ALLOW_METHODS, methods),
        (ACCESS_CONTROL_ALLOW_HEADERS, headers),
    ])
}

/// Build one overriding header layer per cross-origin header
///
/// Unlike a negotiating CORS layer these headers are unconditional, so error
/// responses and requests without an `Origin` header carry them too.
///
/// # Errors
///
/// Returns an error if a configured value is not a valid header value
pub fn cors_layers(config: &CorsConfig) -> anyhow::Result<Vec<SetResponseHeaderLayer<HeaderValue>>> {
    Ok(cors_headers(config)?
        .into_iter()
        .map(|(name, value)| SetResponseHeaderLayer::overriding(name, value))
        .collect())
}
