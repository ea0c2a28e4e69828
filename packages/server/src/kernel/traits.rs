// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// What to prompt for and how to read the reply lives in the domain layer.
//
// Naming convention: Base* for trait names (e.g., BaseCompletionClient)

use async_trait::async_trait;
use openrouter_client::{ChatCompletion, Result};

// =============================================================================
// Completion Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[async_trait]
pub trait BaseCompletionClient: Send + Sync {
    /// Send `prompt` as the sole user message and return the raw completion.
    ///
    /// Exactly one upstream call per invocation, no retry.
    async fn complete(&self, model: &str, prompt: &str) -> Result<ChatCompletion>;
}
