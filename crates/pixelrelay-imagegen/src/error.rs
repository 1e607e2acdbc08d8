use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pixelrelay_config::DeploymentMode;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Every way a forwarding call can end other than success
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Inbound method is neither POST nor OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Inbound body carries no usable prompt
    #[error("{0}")]
    InvalidPrompt(String),

    /// The upstream credential is not configured; holds the setting name
    #[error("Server configuration error: {0} is not set")]
    MissingCredential(String),

    /// Upstream rejected the credential; holds the setting name
    #[error("Authentication with the image generation API failed. Please verify the {0} setting.")]
    UpstreamAuth(String),

    /// Upstream answered 429 after all retries
    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    UpstreamRateLimited,

    /// Upstream answered any other non-success status
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: serde_json::Value,
    },

    /// Inbound body could not be read, e.g. it exceeds the size limit
    #[error("{0}")]
    RequestBody(BytesRejection),

    /// Transport failure or malformed body
    #[error("Internal server error: {0:#}")]
    Internal(anyhow::Error),
}

impl GenerateError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamAuth(_) => StatusCode::UNAUTHORIZED,
            Self::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            Self::RequestBody(rejection) => rejection.status(),
            Self::MissingCredential(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the JSON body returned to the caller
    ///
    /// Internal failures carry their full cause chain as `message`; the debug
    /// rendering is only attached outside production.
    fn body(&self, mode: DeploymentMode) -> ErrorBody {
        match self {
            Self::Upstream {
                status,
                message,
                details,
            } => ErrorBody {
                error: message.clone(),
                details: Some(details.clone()),
                status: Some(*status),
                ..ErrorBody::default()
            },
            Self::Internal(err) => ErrorBody {
                error: "Internal server error".to_string(),
                message: Some(format!("{err:#}")),
                stack: (!mode.is_production()).then(|| format!("{err:?}")),
                ..ErrorBody::default()
            },
            _ => ErrorBody {
                error: self.to_string(),
                ..ErrorBody::default()
            },
        }
    }
}

/// Error response body; `error` is always present
#[derive(Debug, Default, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// A [`GenerateError`] bound to the deployment mode it is rendered for
#[derive(Debug)]
pub struct ErrorReply {
    pub error: GenerateError,
    pub mode: DeploymentMode,
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        (status, Json(self.error.body(self.mode))).into_response()
    }
}
