//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request plus body read exceeded the budget.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Endpoint answered with a non-success status.
    #[error("Unexpected status code: {0}")]
    Status(u16),

    /// Body was not a JSON array of outage records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// True for network, timeout, status and decode failures.
    ///
    /// Everything else is unexpected and indicates a misconfiguration.
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            FetchError::Http(_) | FetchError::Timeout(_) | FetchError::Status(_) | FetchError::Json(_)
        )
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => FetchError::Http(e),
            HttpError::DomainNotAllowed(host) => FetchError::DomainNotAllowed(host),
            HttpError::InvalidUrl(msg) => FetchError::InvalidUrl(msg),
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(FetchError::Timeout(10).is_communication());
        assert!(FetchError::Status(503).is_communication());

        let json_err = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        assert!(FetchError::from(json_err).is_communication());

        assert!(!FetchError::DomainNotAllowed("evil.com".into()).is_communication());
        assert!(!FetchError::from(HttpError::InvalidUrl("x".into())).is_communication());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            FetchError::Timeout(10).to_string(),
            "Request timed out after 10 seconds"
        );
        assert_eq!(FetchError::Status(500).to_string(), "Unexpected status code: 500");
    }
}
