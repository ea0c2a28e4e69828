// Test dependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use openrouter_client::{ChatCompletion, OpenRouterError, Result};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use super::BaseCompletionClient;

// =============================================================================
// Mock Completion Client
// =============================================================================

/// Arguments captured from a completion call
#[derive(Debug, Clone)]
pub struct CompletionCallArgs {
    pub model: String,
    pub prompt: String,
}

/// Replays queued completions in order and records every call.
///
/// When the queue is empty it answers with an empty JSON array.
#[derive(Clone, Default)]
pub struct MockCompletionClient {
    responses: Arc<Mutex<Vec<Result<ChatCompletion>>>>,
    calls: Arc<Mutex<Vec<CompletionCallArgs>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chat-shaped response whose message content is `content`
    pub fn with_content(self, content: &str) -> Self {
        self.with_raw_response(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    /// Queue an arbitrary response body
    pub fn with_raw_response(self, raw: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Ok(ChatCompletion::from_value(raw)));
        self
    }

    /// Queue an upstream failure
    pub fn with_error(self, error: OpenRouterError) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<CompletionCallArgs> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of completion calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseCompletionClient for MockCompletionClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<ChatCompletion> {
        self.calls.lock().unwrap().push(CompletionCallArgs {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            responses.remove(0)
        } else {
            Ok(ChatCompletion::from_value(json!({
                "choices": [{ "message": { "content": "[]" } }]
            })))
        }
    }
}
