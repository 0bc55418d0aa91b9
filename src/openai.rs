//! Chat-completions client configuration and API key handling.

use crate::error::{Result, SkylarkError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Environment variables consulted for the model API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["SKYLARK_API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY"];

/// Secret key for the hosted model. Only ever held in memory.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Use an explicitly supplied key, falling back to the environment.
    pub fn resolve(explicit: Option<&str>) -> Option<Self> {
        explicit.and_then(Self::new).or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok().and_then(Self::new))
        })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for diagnostics.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

/// Create a chat-completions client for an OpenAI-compatible endpoint.
pub fn create_client(
    api_key: &ApiKey,
    api_base: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SkylarkError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_key(api_key.expose())
        .with_api_base(api_base.trim_end_matches('/'));

    Ok(Client::with_config(config).with_http_client(http_client))
}
