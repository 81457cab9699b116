//! Error types for completion requests

use thiserror::Error;

/// Result type for completion requests
pub type Result<T> = std::result::Result<T, LLMError>;

/// Longest slice of an error body kept in [`LLMError::Status`]
const MAX_BODY_CHARS: usize = 300;

/// Ways a completion request can fail
#[derive(Error, Debug)]
pub enum LLMError {
    /// Missing or unusable settings; raised before any request is sent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Endpoint rejected the API key
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Endpoint is throttling us
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Model name unknown to the endpoint
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure or timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LLMError {
    /// Classify a non-success HTTP answer
    pub fn from_status(status: u16, model: &str, body: &str) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed,
            429 => Self::RateLimited(truncate(body)),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::Status {
                status,
                body: truncate(body),
            },
        }
    }

    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            LLMError::from_status(401, "gpt-4o-mini", ""),
            LLMError::AuthenticationFailed
        ));
        match LLMError::from_status(404, "gpt-9", "{}") {
            LLMError::ModelNotFound(model) => assert_eq!(model, "gpt-9"),
            other => panic!("Expected ModelNotFound, got {other:?}"),
        }
        let err = LLMError::from_status(503, "m", " overloaded ");
        assert_eq!(err.to_string(), "HTTP 503: overloaded");
        assert!(err.is_transient());
        assert!(!LLMError::from_status(400, "m", "bad").is_transient());
        assert!(LLMError::from_status(429, "m", "slow down").is_transient());
    }

    #[test]
    fn test_long_bodies_truncated() {
        let body = "x".repeat(1000);
        match LLMError::from_status(500, "m", &body) {
            LLMError::Status { body, .. } => assert_eq!(body.chars().count(), MAX_BODY_CHARS + 1),
            other => panic!("Expected Status, got {other:?}"),
        }
    }
}
