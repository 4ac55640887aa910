use std::time::Duration;

use thiserror::Error;

/// Failures talking to the hosted API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("rate limited by the API")]
    RateLimited { retry_after: Option<Duration> },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Rate limits, server errors, timeouts and connection failures are worth
    /// another attempt. Client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } | ApiError::Timeout(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
            ApiError::Decode(_) | ApiError::UnexpectedResponse(_) => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}
