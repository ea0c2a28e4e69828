//! Error types for the OpenRouter client.

use thiserror::Error;

/// Result type for OpenRouter client operations.
pub type Result<T> = std::result::Result<T, OpenRouterError>;

/// OpenRouter client errors.
#[derive(Debug, Error)]
pub enum OpenRouterError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, transport timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `body` is the parsed JSON error body, or the raw
    /// text as a JSON string when it does not parse.
    #[error("API error ({status}): {body}")]
    Api {
        status: u16,
        body: serde_json::Value,
    },

    /// Parse error (2xx response that is not JSON)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenRouterError {
    /// Upstream HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenRouterError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
