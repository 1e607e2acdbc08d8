use anyhow::Context;
use bytes::Bytes;
use pixelrelay_config::{Config, DeploymentMode};
use reqwest::StatusCode;
use secrecy::SecretString;
use url::Url;

use crate::{
    error::{GenerateError, Result},
    options::GenerationOptions,
    retry::{RetryPolicy, RetryingClient},
    types::GenerationRequest,
};

/// Fallback message when an upstream error body names no reason
const GENERIC_UPSTREAM_MESSAGE: &str = "Failed to generate image";

/// Forwards generation requests to the upstream API
///
/// Built once at startup; holds only read-only state.
pub struct Generator {
    client: RetryingClient,
    endpoint: Url,
    api_key: Option<SecretString>,
    api_key_env: String,
    options: GenerationOptions,
    mode: DeploymentMode,
}

impl Generator {
    pub const fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Forward one inbound body upstream and return the upstream payload
    ///
    /// The credential is checked before the body so that an unconfigured
    /// deployment answers 500 for every request.
    ///
    /// # Errors
    ///
    /// Returns the [`GenerateError`] variant matching the failed step
    pub async fn generate(&self, body: &[u8]) -> Result<Bytes> {
        let Some(api_key) = &self.api_key else {
            tracing::error!(setting = %self.api_key_env, "upstream credential is not configured");
            return Err(GenerateError::MissingCredential(self.api_key_env.clone()));
        };

        let request = GenerationRequest::from_body(body).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected generation request");
        })?;

        tracing::info!(
            model = %self.options.model,
            prompt_chars = request.prompt.chars().count(),
            "starting image generation"
        );

        let payload = self.options.payload(&request.prompt);

        let response = self
            .client
            .post_json(&self.endpoint, api_key, &payload)
            .await
            .context("image generation request failed")
            .map_err(GenerateError::Internal)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("failed to read image generation response")
            .map_err(GenerateError::Internal)?;

        let result = map_upstream_response(status, body, &self.api_key_env);

        match &result {
            Ok(_) => tracing::info!(status = %status, "image generation complete"),
            Err(e) => tracing::error!(status = %status, error = %e, "image generation failed"),
        }

        result
    }
}

/// Translate the final upstream response into the caller's result
///
/// # Errors
///
/// Returns an error for every non-success status, or a success body that is
/// not JSON
pub fn map_upstream_response(status: StatusCode, body: Bytes, api_key_env: &str) -> Result<Bytes> {
    if status.is_success() {
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)
            .context("image generation API returned a malformed response")
            .map_err(GenerateError::Internal)?;
        return Ok(body);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(GenerateError::UpstreamRateLimited),
        StatusCode::UNAUTHORIZED => Err(GenerateError::UpstreamAuth(api_key_env.to_string())),
        _ => {
            let details = parse_error_details(&body);
            let message = upstream_message(&details).unwrap_or(GENERIC_UPSTREAM_MESSAGE).to_string();

            Err(GenerateError::Upstream {
                status: status.as_u16(),
                message,
                details,
            })
        }
    }
}

/// Upstream error payload as JSON, or as a string when it is not JSON
fn parse_error_details(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Best-effort reason from common error shapes
///
/// Recognizes `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`.
fn upstream_message(details: &serde_json::Value) -> Option<&str> {
    details
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| details.get("error").and_then(serde_json::Value::as_str))
        .or_else(|| details.get("message").and_then(serde_json::Value::as_str))
        .filter(|message| !message.is_empty())
}

/// Builder for constructing the generator from configuration
pub struct GeneratorBuilder<'a> {
    config: &'a Config,
}

impl<'a> GeneratorBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns an error if the retry policy or timeout cannot be parsed, or
    /// the HTTP client cannot be constructed
    pub fn build(self) -> anyhow::Result<Generator> {
        let upstream = &self.config.upstream;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = upstream.timeout_duration()? {
            http = http.timeout(timeout);
        }
        let http = http.build().context("failed to build upstream HTTP client")?;

        let policy = RetryPolicy::from_config(&upstream.retry)?;
        let api_key = upstream.resolve_api_key();
        let options = GenerationOptions::from_config(&self.config.generation);
        let mode = self.config.deployment.mode;

        if api_key.is_none() {
            tracing::warn!(
                setting = %upstream.api_key_env,
                "upstream credential is not configured; generation requests will fail"
            );
        }

        tracing::debug!(
            endpoint = %upstream.endpoint,
            model = %options.model,
            steps = options.steps,
            max_retries = policy.max_retries,
            %mode,
            "image generator initialized"
        );

        Ok(Generator {
            client: RetryingClient::new(http, policy),
            endpoint: upstream.endpoint.clone(),
            api_key,
            api_key_env: upstream.api_key_env.clone(),
            options,
            mode,
        })
    }
}
