//! Recover a JSON array from free-form model output.
//!
//! Models are told to answer with a bare JSON array but often wrap it in
//! prose or markdown fences. Text goes through a fixed pipeline of
//! [`RecoveryStrategy`]s; each either produces a value or declines.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    // `[` ... `]` where the closing bracket ends the text
    static ref END_ANCHORED_ARRAY: Regex = Regex::new(r"(?s)\[.*\]$").unwrap();

    // first `[` through the last `]`, anywhere
    static ref FIRST_ARRAY: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
}

/// Model payload as read from the completion response.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Already structured (some providers return JSON content directly)
    Structured(Value),
    /// Free text that may contain JSON
    Text(String),
}

impl RawOutput {
    /// The payload as text, for diagnostics.
    pub fn as_text(&self) -> String {
        match self {
            RawOutput::Structured(value) => value.to_string(),
            RawOutput::Text(text) => text.clone(),
        }
    }
}

impl From<Value> for RawOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RawOutput::Text(text),
            other => RawOutput::Structured(other),
        }
    }
}

/// No JSON array could be recovered from the text.
#[derive(Debug, Error)]
#[error("Unable to find JSON array in model output")]
pub struct ParseError {
    /// The original model text
    pub raw: String,
}

/// One step of the text recovery pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Parse the whole text as JSON
    StrictParse,
    /// Parse the bracketed span that ends the text
    EndAnchoredArray,
    /// Parse the first bracketed span anywhere in the text
    FirstArray,
}

impl RecoveryStrategy {
    /// Strategies in the order they are tried.
    pub const PIPELINE: [RecoveryStrategy; 3] = [
        RecoveryStrategy::StrictParse,
        RecoveryStrategy::EndAnchoredArray,
        RecoveryStrategy::FirstArray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStrategy::StrictParse => "strict_parse",
            RecoveryStrategy::EndAnchoredArray => "end_anchored_array",
            RecoveryStrategy::FirstArray => "first_array",
        }
    }

    /// Try this strategy, returning `None` to decline.
    pub fn attempt(&self, text: &str) -> Option<Value> {
        let candidate = match self {
            RecoveryStrategy::StrictParse => text,
            RecoveryStrategy::EndAnchoredArray => END_ANCHORED_ARRAY.find(text)?.as_str(),
            RecoveryStrategy::FirstArray => FIRST_ARRAY.find(text)?.as_str(),
        };
        serde_json::from_str(candidate).ok()
    }
}

/// Recover structured content from a model payload.
///
/// Structured input (array or not) is returned unchanged; rejecting
/// non-array shapes is the caller's job.
pub fn extract(raw: RawOutput) -> Result<Value, ParseError> {
    match raw {
        RawOutput::Structured(value) => Ok(value),
        RawOutput::Text(text) => extract_text(&text),
    }
}

/// Run the recovery pipeline over model text.
pub fn extract_text(text: &str) -> Result<Value, ParseError> {
    for strategy in RecoveryStrategy::PIPELINE {
        if let Some(value) = strategy.attempt(text) {
            tracing::debug!(strategy = strategy.name(), "Recovered JSON from model output");
            return Ok(value);
        }
    }

    Err(ParseError {
        raw: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> RawOutput {
        RawOutput::Text(s.to_string())
    }

    #[test]
    fn test_structured_array_returned_unchanged() {
        let value = json!([{ "a": 1 }]);
        assert_eq!(extract(RawOutput::Structured(value.clone())).unwrap(), value);
    }

    #[test]
    fn test_structured_object_returned_unchanged() {
        let value = json!({ "platform": "Facebook" });
        assert_eq!(extract(RawOutput::Structured(value.clone())).unwrap(), value);
    }

    #[test]
    fn test_strict_json_array() {
        assert_eq!(extract(text(r#"[{"a":1}]"#)).unwrap(), json!([{ "a": 1 }]));
    }

    #[test]
    fn test_strict_parse_accepts_non_array_json() {
        assert_eq!(extract(text(r#"{"a":1}"#)).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn test_array_embedded_in_prose() {
        let value = extract(text(r#"Here you go: [{"a":1}] thanks"#)).unwrap();
        assert_eq!(value, json!([{ "a": 1 }]));
    }

    #[test]
    fn test_array_ending_the_text() {
        let value = extract(text("Sure! Here is the content:\n[{\"a\":1},{\"b\":2}]")).unwrap();
        assert_eq!(value, json!([{ "a": 1 }, { "b": 2 }]));
    }

    #[test]
    fn test_array_inside_markdown_fence() {
        let raw = "```json\n[\n  {\"platform\": \"Facebook\", \"hashtags\": [\"#a\"]}\n]\n```";
        let value = extract(text(raw)).unwrap();
        assert_eq!(value, json!([{ "platform": "Facebook", "hashtags": ["#a"] }]));
    }

    #[test]
    fn test_not_json_at_all() {
        let err = extract(text("not json at all")).unwrap_err();
        assert_eq!(err.raw, "not json at all");
    }

    #[test]
    fn test_unparsable_bracket_span() {
        assert!(extract(text("see [this, that] for details")).is_err());
    }

    #[test]
    fn test_raw_output_from_value() {
        assert_eq!(RawOutput::from(json!("[1]")), text("[1]"));
        assert_eq!(
            RawOutput::from(json!([1])),
            RawOutput::Structured(json!([1]))
        );
    }

    #[test]
    fn test_strategy_declines_without_brackets() {
        assert!(RecoveryStrategy::EndAnchoredArray.attempt("no brackets").is_none());
        assert!(RecoveryStrategy::FirstArray.attempt("no brackets").is_none());
    }

    #[test]
    fn test_end_anchored_requires_trailing_bracket() {
        assert!(RecoveryStrategy::EndAnchoredArray.attempt("[1] trailing").is_none());
        assert_eq!(RecoveryStrategy::FirstArray.attempt("[1] trailing"), Some(json!([1])));
    }
}
