use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Short message for inline banners. Panels never see more than this.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Network error - backend unreachable".to_string(),
            ApiError::Timeout(after) => format!("Request timed out after {}s", after.as_secs()),
            ApiError::Http { status, message } if message.is_empty() => {
                format!("Request failed with status {}", status)
            }
            ApiError::Http { status, message } => format!("{} ({})", message, status),
            ApiError::Decode(_) => "Unexpected response from backend".to_string(),
            ApiError::Config(msg) => format!("Invalid configuration: {}", msg),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not carry the configured duration; callers that
            // know it rewrap via HttpClient::classify.
            ApiError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
