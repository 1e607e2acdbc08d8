use anyhow::Context;
use serde::Deserialize;

use crate::error::{GenerateError, Result};

/// Caller's generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Text description of the desired image, forwarded as-is
    pub prompt: String,
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(default)]
    prompt: Option<serde_json::Value>,
}

impl GenerationRequest {
    /// Parse and validate an inbound request body
    ///
    /// An empty body is treated as an object without a prompt. A body that is
    /// not JSON is an internal failure rather than a validation error.
    ///
    /// # Errors
    ///
    /// `InvalidPrompt` when the prompt is absent, not a string, or empty;
    /// `Internal` when the body is not valid JSON
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(missing_prompt());
        }

        let value: serde_json::Value = serde_json::from_slice(body)
            .context("failed to parse request body as JSON")
            .map_err(GenerateError::Internal)?;

        let raw = match value {
            serde_json::Value::Object(_) => serde_json::from_value::<RawRequest>(value)
                .context("failed to read request body")
                .map_err(GenerateError::Internal)?,
            _ => return Err(missing_prompt()),
        };

        match raw.prompt {
            Some(serde_json::Value::String(prompt)) if !prompt.is_empty() => Ok(Self { prompt }),
            Some(serde_json::Value::String(_) | serde_json::Value::Null) | None => Err(missing_prompt()),
            Some(_) => Err(GenerateError::InvalidPrompt("Prompt must be a string".to_string())),
        }
    }
}

fn missing_prompt() -> GenerateError {
    GenerateError::InvalidPrompt("Prompt is required".to_string())
}
