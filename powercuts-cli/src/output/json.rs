//! JSON output formatting.

use anyhow::Result;
use powercuts_fetch::{ProbeOutcome, ProbeResult};
use serde::Serialize;

use crate::monitor::EntryReport;

// ============================================================================
// Output Types
// ============================================================================

/// Probe result output.
#[derive(Debug, Serialize)]
pub struct ProbeOutput<'a> {
    pub endpoint: &'a str,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats entry reports: an object for one, an array otherwise.
    pub fn format_reports(&self, reports: &[EntryReport]) -> Result<String> {
        match reports {
            [single] => self.format(single),
            _ => self.format(&reports),
        }
    }

    /// Formats a probe result.
    pub fn format_probe(&self, endpoint: &str, result: &ProbeResult) -> Result<String> {
        let error = match &result.outcome {
            ProbeOutcome::Reachable => None,
            ProbeOutcome::BadStatus(code) => Some(format!("HTTP {code}")),
            ProbeOutcome::Unreachable(reason) | ProbeOutcome::Unexpected(reason) => {
                Some(reason.clone())
            }
        };

        self.format(&ProbeOutput {
            endpoint,
            reachable: result.success(),
            status_code: result.status_code,
            response_time_ms: result.response_time_ms,
            error,
        })
    }
}
