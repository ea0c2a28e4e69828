use serde_json::Value;
use thiserror::Error;

/// Failures of a single content generation request. None are retried.
#[derive(Debug, Error)]
pub enum ContentGenerationError {
    /// Blank topic, rejected before any upstream call
    #[error("Please provide a topic for content generation")]
    InvalidInput,

    /// No completion credential configured
    #[error("Server misconfiguration: missing API key")]
    ServerMisconfiguration,

    /// Completion endpoint failed. `status` is `None` for transport failures.
    #[error("Model API error")]
    Upstream {
        status: Option<u16>,
        details: Value,
    },

    /// 2xx response with no model payload
    #[error("No content returned from model")]
    EmptyUpstreamOutput,

    /// Payload present but not an array, even after recovery
    #[error("Failed to parse model output. Ensure model returns valid JSON array.")]
    MalformedOutput {
        /// Raw model text, truncated for diagnostics
        raw_output: String,
    },
}

impl ContentGenerationError {
    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, ContentGenerationError::InvalidInput)
    }
}
