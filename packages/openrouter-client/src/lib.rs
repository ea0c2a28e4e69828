//! OpenAI-compatible chat completion client for OpenRouter
//!
//! A minimal client with no domain-specific logic: it sends one chat
//! completion request and hands back the raw response so callers can
//! decide how to read it.
//!
//! # Example
//!
//! ```rust,ignore
//! use openrouter_client::{ChatRequest, Message, OpenRouterClient};
//!
//! let client = OpenRouterClient::from_env()?;
//!
//! let completion = client
//!     .chat_completion(ChatRequest::new("tngtech/deepseek-r1t2-chimera:free").message(Message::user("Hello!")))
//!     .await?;
//!
//! let text = completion.content().and_then(|c| c.as_str());
//! ```

pub mod error;
pub mod types;

pub use error::{OpenRouterError, Result};
pub use types::*;

use reqwest::{header, Client};
use tracing::{debug, warn};

/// Default OpenRouter API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat completion client.
#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| OpenRouterError::Config("OPENROUTER_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, other OpenAI-compatible hosts).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Issues exactly one request. Non-2xx responses are returned as
    /// [`OpenRouterError::Api`] with the upstream status and body.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatCompletion> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenRouter request failed");
                OpenRouterError::Network(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OpenRouterError::Network(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            warn!(status = %status, error = %body, "OpenRouter API error");
            return Err(OpenRouterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| OpenRouterError::Parse(e.to_string()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenRouter chat completion"
        );

        Ok(ChatCompletion::from_value(raw))
    }
}
