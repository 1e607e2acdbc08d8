//! Bounded retry for upstream calls
//!
//! Transport failures wait a fixed delay; 429 and 5xx responses back off
//! exponentially. Any other client error is final on the first attempt.

use std::time::Duration;

use pixelrelay_config::RetryConfig;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

/// Retry bounds and delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait after a transport failure
    pub transport_delay: Duration,
    /// Wait after the first retryable status; doubled for every later attempt
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            transport_delay: Duration::from_secs(1),
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// # Errors
    ///
    /// Returns an error if a configured delay is not a valid duration
    pub fn from_config(config: &RetryConfig) -> anyhow::Result<Self> {
        Ok(Self {
            max_retries: config.max_retries,
            transport_delay: config.transport_delay_duration()?,
            backoff_base: config.backoff_base_duration()?,
        })
    }

    /// Total attempts including the first
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before the retry that follows a retryable status on `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Whether a response ends the retry loop regardless of attempts left
///
/// Success and every client error except 429 are final: the request itself
/// is wrong and repeating it cannot help.
pub fn is_terminal(status: StatusCode) -> bool {
    status.is_success() || (status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS)
}

/// HTTP client that retries transient upstream failures
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub const fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// POST `body` as JSON with a bearer credential, retrying transient failures
    ///
    /// Returns the first terminal response, or the last response once attempts
    /// run out even if its status is retryable.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the final attempt
    pub async fn post_json<T>(&self, url: &Url, bearer: &SecretString, body: &T) -> Result<Response, reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            let is_last = attempt + 1 >= max_attempts;

            let result = self
                .client
                .post(url.clone())
                .bearer_auth(bearer.expose_secret())
                .json(body)
                .send()
                .await;

            let delay = match result {
                Err(e) if is_last => {
                    tracing::error!(attempt = attempt + 1, max_attempts, error = %e, "upstream request failed, giving up");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        delay = ?self.policy.transport_delay,
                        "upstream request failed, retrying"
                    );
                    self.policy.transport_delay
                }
                Ok(response) if is_terminal(response.status()) || is_last => return Ok(response),
                Ok(response) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        status = %response.status(),
                        delay = ?delay,
                        "upstream returned retryable status, backing off"
                    );
                    delay
                }
            };

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_client_errors_are_terminal() {
        assert!(is_terminal(StatusCode::OK));
        assert!(is_terminal(StatusCode::CREATED));
        assert!(is_terminal(StatusCode::BAD_REQUEST));
        assert!(is_terminal(StatusCode::UNAUTHORIZED));
        assert!(is_terminal(StatusCode::NOT_FOUND));
    }

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(!is_terminal(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_terminal(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_terminal(StatusCode::BAD_GATEWAY));
        assert!(!is_terminal(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn default_policy_allows_three_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }

    #[test]
    fn policy_from_config() {
        let config = RetryConfig {
            max_retries: 5,
            transport_delay: "10ms".to_string(),
            backoff_base: "20ms".to_string(),
        };

        let policy = RetryPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.transport_delay, Duration::from_millis(10));
        assert_eq!(policy.backoff(1), Duration::from_millis(40));
    }
}
