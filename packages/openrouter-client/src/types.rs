//! Chat completion request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Chat Completion Request
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "tngtech/deepseek-r1t2-chimera:free")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

// =============================================================================
// Chat Completion Response
// =============================================================================

/// Where a provider may put the model's textual payload.
///
/// OpenAI-compatible providers disagree on the response shape, so the
/// payload is looked up through [`ContentAccessor::ORDERED`] and the first
/// non-null candidate wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAccessor {
    /// `choices[0].message.content` (chat completion shape)
    MessageContent,
    /// `choices[0].text` (legacy completion shape)
    ChoiceText,
    /// `output_text` (flat responses shape)
    OutputText,
}

impl ContentAccessor {
    /// Lookup order for [`ChatCompletion::content`].
    pub const ORDERED: [ContentAccessor; 3] = [
        ContentAccessor::MessageContent,
        ContentAccessor::ChoiceText,
        ContentAccessor::OutputText,
    ];

    /// Read this accessor's field from a raw response, declining on null or absent.
    pub fn read<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        let candidate = match self {
            ContentAccessor::MessageContent => raw.pointer("/choices/0/message/content"),
            ContentAccessor::ChoiceText => raw.pointer("/choices/0/text"),
            ContentAccessor::OutputText => raw.get("output_text"),
        };
        candidate.filter(|value| !value.is_null())
    }
}

/// Chat completion response, kept as raw JSON.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    raw: Value,
}

impl ChatCompletion {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// The full response body.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The model's payload from the first accessor that yields one.
    ///
    /// Usually a string, but some providers return structured content, so
    /// the value is handed back untouched.
    pub fn content(&self) -> Option<&Value> {
        ContentAccessor::ORDERED
            .iter()
            .find_map(|accessor| accessor.read(&self.raw))
    }

    /// Token usage statistics, when the provider reports them.
    pub fn usage(&self) -> Option<Usage> {
        self.raw
            .get("usage")
            .and_then(|usage| serde_json::from_value(usage.clone()).ok())
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,

    /// Total tokens used
    pub total_tokens: u32,
}

// =============================================================================
// Utilities
// =============================================================================

/// Truncate a string to at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
