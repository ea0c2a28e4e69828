//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to the HTTP layer. External services
//! sit behind trait abstractions so tests can swap in mocks.

use std::sync::Arc;

use openrouter_client::OpenRouterClient;

use crate::config::Config;
use crate::kernel::BaseCompletionClient;

/// Server dependencies accessible to route handlers
#[derive(Clone)]
pub struct ServerDeps {
    /// Completion client, `None` when no credential is configured
    pub completion: Option<Arc<dyn BaseCompletionClient>>,
    /// Model id sent with every completion request
    pub model: String,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(completion: Option<Arc<dyn BaseCompletionClient>>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    /// Wire the real OpenRouter client from configuration
    pub fn from_config(config: &Config) -> Self {
        let completion = config.openrouter_api_key.as_ref().map(|key| {
            Arc::new(
                OpenRouterClient::new(key.clone()).with_base_url(config.openrouter_base_url.clone()),
            ) as Arc<dyn BaseCompletionClient>
        });

        Self::new(completion, config.openrouter_model.clone())
    }
}
