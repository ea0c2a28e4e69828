use std::sync::Arc;

use openrouter_client::{truncate_chars, OpenRouterError};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::error::ContentGenerationError;
use super::extraction::{extract, RawOutput};
use super::prompt::build_generation_prompt;
use crate::kernel::{BaseCompletionClient, ServerDeps};

/// Maximum characters of raw model text echoed back on parse failures
pub const RAW_OUTPUT_LIMIT: usize = 2000;

/// Turns a topic into an array of post drafts via one completion call.
///
/// Results are not cached and failures are not retried.
#[derive(Clone)]
pub struct ContentGenerationService {
    completion: Option<Arc<dyn BaseCompletionClient>>,
    model: String,
}

impl ContentGenerationService {
    pub fn new(completion: Option<Arc<dyn BaseCompletionClient>>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    pub fn from_deps(deps: &ServerDeps) -> Self {
        Self::new(deps.completion.clone(), deps.model.clone())
    }

    /// Whether a completion credential is configured
    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    /// Generate drafts for `topic_text`.
    ///
    /// Returns the model's array as-is; per-draft normalization is left to
    /// the caller.
    pub async fn generate(&self, topic_text: &str) -> Result<Vec<Value>, ContentGenerationError> {
        if topic_text.trim().is_empty() {
            return Err(ContentGenerationError::InvalidInput);
        }

        let completion = self.completion.as_ref().ok_or_else(|| {
            error!("Missing OPENROUTER_API_KEY");
            ContentGenerationError::ServerMisconfiguration
        })?;

        let prompt = build_generation_prompt(topic_text);
        info!(topic_length = topic_text.len(), model = %self.model, "Generating content");

        let response = completion
            .complete(&self.model, &prompt)
            .await
            .map_err(upstream_error)?;

        let raw = match response.content() {
            None => None,
            Some(Value::String(text)) if text.is_empty() => None,
            Some(content) => Some(RawOutput::from(content.clone())),
        }
        .ok_or_else(|| {
            error!(response = %response.raw(), "No output from model");
            ContentGenerationError::EmptyUpstreamOutput
        })?;

        let raw_text = raw.as_text();
        let malformed = || ContentGenerationError::MalformedOutput {
            raw_output: truncate_chars(&raw_text, RAW_OUTPUT_LIMIT).to_string(),
        };

        let generated = extract(raw).map_err(|e| {
            error!(error = %e, raw_output = %truncate_chars(&raw_text, 200), "Failed to parse generated content");
            malformed()
        })?;

        match generated {
            Value::Array(drafts) => {
                debug!(drafts = drafts.len(), "Generated content parsed");
                Ok(drafts)
            }
            other => {
                warn!(kind = json_kind(&other), "Parsed content is not an array");
                Err(malformed())
            }
        }
    }
}

fn upstream_error(e: OpenRouterError) -> ContentGenerationError {
    warn!(error = %e, "Completion request failed");
    let status = e.status();
    let details = match e {
        OpenRouterError::Api { body, .. } => body,
        other => Value::String(other.to_string()),
    };
    ContentGenerationError::Upstream { status, details }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
