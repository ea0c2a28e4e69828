use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Default model used for content generation
pub const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Completion credential. Absence is reported per request, not at startup.
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openrouter_api_key: lookup("OPENROUTER_API_KEY").filter(|key| !key.trim().is_empty()),
            openrouter_model: lookup("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base_url: lookup("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| openrouter_client::DEFAULT_BASE_URL.to_string()),
        })
    }
}
