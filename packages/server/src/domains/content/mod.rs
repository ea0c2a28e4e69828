//! Content domain - AI-written post drafts from a topic.

pub mod error;
pub mod extraction;
pub mod prompt;
pub mod service;

pub use error::ContentGenerationError;
pub use extraction::{extract, ParseError, RawOutput, RecoveryStrategy};
pub use prompt::build_generation_prompt;
pub use service::{ContentGenerationService, RAW_OUTPUT_LIMIT};
