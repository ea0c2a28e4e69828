// Completion implementation using OpenRouter
//
// This is the infrastructure implementation of BaseCompletionClient.
// Prompt building and output parsing live in domains/content.

use async_trait::async_trait;
use openrouter_client::{ChatCompletion, ChatRequest, Message, OpenRouterClient, Result};

use super::BaseCompletionClient;

#[async_trait]
impl BaseCompletionClient for OpenRouterClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<ChatCompletion> {
        tracing::info!(model = model, prompt_length = prompt.len(), "Calling OpenRouter API");

        let request = ChatRequest::new(model).message(Message::user(prompt));
        let completion = self.chat_completion(request).await.map_err(|e| {
            tracing::error!(error = %e, model = model, "OpenRouter API call failed");
            e
        })?;

        if let Some(usage) = completion.usage() {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenRouter token usage"
            );
        }

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_openrouter_client_is_a_completion_client() {
        fn _assert_completion_client<T: BaseCompletionClient>() {}

        _assert_completion_client::<OpenRouterClient>();
        let _: Arc<dyn BaseCompletionClient> = Arc::new(OpenRouterClient::new("sk-or-test"));
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_complete() {
        let client = OpenRouterClient::from_env()
            .expect("OPENROUTER_API_KEY must be set for integration tests");

        let completion = client
            .complete(crate::DEFAULT_MODEL, "Say 'Hello, World!' and nothing else.")
            .await
            .expect("Completion should succeed");

        let text = completion.content().and_then(|c| c.as_str()).unwrap_or_default();
        assert!(text.contains("Hello"));
    }
}
