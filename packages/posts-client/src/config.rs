use anyhow::Result;
use dotenvy::dotenv;
use std::env;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash
    pub backend_url: String,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self::new(
            env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
        ))
    }

    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(
            ClientConfig::new("https://api.example.com/").backend_url,
            "https://api.example.com"
        );
    }
}
