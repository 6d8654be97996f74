//! Endpoint reachability probe.

use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::debug;

use powercuts_core::consts::REQUEST_TIMEOUT;

use crate::error::HttpError;
use crate::http::HttpClient;

/// How a probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Endpoint answered 200.
    Reachable,
    /// Endpoint answered with another status.
    BadStatus(u16),
    /// Network failure or timeout.
    Unreachable(String),
    /// Anything else, e.g. an invalid URL.
    Unexpected(String),
}

/// Result of a probe check.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// How the probe ended.
    pub outcome: ProbeOutcome,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
    /// Status code, if a response arrived.
    pub status_code: Option<u16>,
}

impl ProbeResult {
    /// Whether the endpoint is usable.
    pub fn success(&self) -> bool {
        self.outcome == ProbeOutcome::Reachable
    }
}

/// A probe for checking endpoint availability.
#[derive(Debug, Clone)]
pub struct Probe {
    /// The URL to probe.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Probe {
    /// Creates a new probe for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Sets the timeout for this probe.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executes the probe and returns the result.
    pub async fn check(&self, client: &HttpClient) -> ProbeResult {
        let start = Instant::now();

        debug!(url = %self.url, "Running probe");

        let result = tokio::time::timeout(self.timeout, client.get(&self.url)).await;
        let response_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (outcome, status_code) = match result {
            Ok(Ok(response)) => {
                let status = response.status();
                let outcome = if status == StatusCode::OK {
                    ProbeOutcome::Reachable
                } else {
                    ProbeOutcome::BadStatus(status.as_u16())
                };
                (outcome, Some(status.as_u16()))
            }
            Ok(Err(HttpError::Request(e))) => (ProbeOutcome::Unreachable(e.to_string()), None),
            Ok(Err(e)) => (ProbeOutcome::Unexpected(e.to_string()), None),
            Err(_) => (
                ProbeOutcome::Unreachable(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs()
                )),
                None,
            ),
        };

        debug!(outcome = ?outcome, response_time_ms, "Probe finished");

        ProbeResult {
            outcome,
            response_time_ms,
            status_code,
        }
    }
}
