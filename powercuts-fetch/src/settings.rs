//! Fetch settings.

use powercuts_core::consts::{API_DOMAIN, API_ENDPOINT, REQUEST_TIMEOUT};
use std::time::Duration;

use crate::http::HttpClient;

/// Settings for fetch operations.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Endpoint returning every current power cut.
    pub endpoint: String,
    /// Budget for one request including the body read.
    pub timeout: Duration,
    /// Domains the client may talk to. `None` allows any.
    pub allowed_domains: Option<Vec<String>>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: API_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
            allowed_domains: Some(vec![API_DOMAIN.to_string()]),
        }
    }
}

impl FetchSettings {
    /// Uses a different endpoint.
    ///
    /// The domain allowlist is dropped unless the endpoint is the default one.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        if self.endpoint != API_ENDPOINT {
            self.allowed_domains = None;
        }
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds an HTTP client honouring the timeout and allowlist.
    pub fn build_client(&self) -> HttpClient {
        let client = HttpClient::with_timeout(self.timeout);
        match &self.allowed_domains {
            Some(domains) => client.restrict_to(domains.clone()),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = FetchSettings::default();
        assert_eq!(settings.endpoint, API_ENDPOINT);
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.allowed_domains.is_some());
    }

    #[test]
    fn test_custom_endpoint_drops_allowlist() {
        let settings = FetchSettings::default().with_endpoint("http://127.0.0.1:9999/getall");
        assert!(settings.allowed_domains.is_none());

        let settings = FetchSettings::default().with_endpoint(API_ENDPOINT);
        assert!(settings.allowed_domains.is_some());
    }
}
