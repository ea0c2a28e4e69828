// Content Generator - API Core
//
// Backend for the social post dashboard: turns a topic into AI-written
// post drafts via an OpenAI-compatible completion API.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
