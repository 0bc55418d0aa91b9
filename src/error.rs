//! Error types for Skylark.

use thiserror::Error;

/// Library-level error type for Skylark operations.
#[derive(Error, Debug)]
pub enum SkylarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Sheets API error: {0}")]
    Sheets(String),

    #[error("Model API error: {0}")]
    Model(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Result type alias for Skylark operations.
pub type Result<T> = std::result::Result<T, SkylarkError>;
