// Error types for showcase.
// Covers GitHub API failures, cache persistence errors, and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GitHub username: {0:?}")]
    InvalidUsername(String),

    #[error("Invalid repository name: {0:?}")]
    InvalidRepository(String),

    #[error("Base64 decoding error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl ShowcaseError {
    /// Whether this failure came from GitHub's rate limiter.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ShowcaseError::RateLimited { .. } => true,
            ShowcaseError::Http { status, .. } => *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;
