#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod generator;
pub mod options;
pub mod retry;
mod types;

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use pixelrelay_config::Config;

pub use error::{ErrorReply, GenerateError, Result};
pub use generator::{Generator, GeneratorBuilder, map_upstream_response};
pub use options::{GenerationOptions, UpstreamPayload};
pub use retry::{RetryPolicy, RetryingClient};
pub use types::GenerationRequest;

/// Build the generator from configuration
///
/// # Errors
///
/// Returns an error if the generator fails to initialize
pub fn build_generator(config: &Config) -> anyhow::Result<Arc<Generator>> {
    let generator = GeneratorBuilder::new(config)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize image generator: {e:#}"))?;

    Ok(Arc::new(generator))
}

/// Create the forwarding endpoint router
///
/// POST forwards, OPTIONS answers preflight, every other method is 405.
pub fn endpoint_router(route: &str) -> Router<Arc<Generator>> {
    Router::new().route(
        route,
        post(generate).options(preflight).fallback(method_not_allowed),
    )
}

/// Handle image generation requests
///
/// Body read failures (such as the size limit) are rendered like every other
/// failure rather than as axum's plain-text rejection.
async fn generate(State(generator): State<Arc<Generator>>, body: std::result::Result<Bytes, BytesRejection>) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), error = %rejection, "failed to read request body");
            return ErrorReply {
                error: GenerateError::RequestBody(rejection),
                mode: generator.mode(),
            }
            .into_response();
        }
    };

    match generator.generate(&body).await {
        Ok(payload) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], payload).into_response(),
        Err(error) => ErrorReply {
            error,
            mode: generator.mode(),
        }
        .into_response(),
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed(State(generator): State<Arc<Generator>>) -> ErrorReply {
    ErrorReply {
        error: GenerateError::MethodNotAllowed,
        mode: generator.mode(),
    }
}
