//! Northern Powergrid power cut fetcher.

use async_trait::async_trait;
use powercuts_core::{OutageSet, PostcodeQuery};
use tracing::{debug, info, instrument};

use crate::error::FetchError;
use crate::http::HttpClient;
use crate::parser::parse_outages;
use crate::settings::FetchSettings;
use crate::source::OutageSource;

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches every current power cut and keeps those matching a postcode.
#[derive(Debug, Clone)]
pub struct PowerCutFetcher {
    client: HttpClient,
    settings: FetchSettings,
}

impl PowerCutFetcher {
    /// Creates a fetcher from settings.
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            client: settings.build_client(),
            settings,
        }
    }

    /// The settings this fetcher was built with.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// GET the endpoint and return the body as text.
    async fn fetch_body(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.settings.endpoint).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl Default for PowerCutFetcher {
    fn default() -> Self {
        Self::new(FetchSettings::default())
    }
}

#[async_trait]
impl OutageSource for PowerCutFetcher {
    fn name(&self) -> &str {
        "northern_powergrid"
    }

    #[instrument(skip(self), fields(postcode = %query))]
    async fn fetch_outages(&self, query: &PostcodeQuery) -> Result<OutageSet, FetchError> {
        debug!(endpoint = %self.settings.endpoint, "Fetching power cuts");

        let timeout = self.settings.timeout;
        let body = tokio::time::timeout(timeout, self.fetch_body())
            .await
            .map_err(|_| FetchError::Timeout(timeout.as_secs()))??;

        let outages = parse_outages(&body, query)?;
        info!(count = outages.len(), "Fetched power cuts");
        Ok(outages)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    const PAYLOAD: &str = r#"[
        {"Reference": "INCD-1", "Postcode": "NE1 1AA", "LoggedTime": "2024-01-01T09:00:00Z"},
        {"Reference": "INCD-2", "Postcode": "NE2 2BB", "LoggedTime": "2024-01-02T09:00:00Z"}
    ]"#;

    fn fetcher_for(server: &MockServer) -> PowerCutFetcher {
        PowerCutFetcher::new(
            FetchSettings::default()
                .with_endpoint(server.url("/Powercut_API/rest/powercuts/getall"))
                .with_timeout(Duration::from_secs(2)),
        )
    }

    #[tokio::test]
    async fn test_fetch_filters_text_plain_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/Powercut_API/rest/powercuts/getall");
                then.status(200)
                    .header("content-type", "text/plain")
                    .body(PAYLOAD);
            })
            .await;

        let outages = fetcher_for(&server)
            .fetch_outages(&PostcodeQuery::new("ne1 1aa"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].reference.as_deref(), Some("INCD-1"));
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503).body("maintenance");
            })
            .await;

        let err = fetcher_for(&server)
            .fetch_outages(&PostcodeQuery::new("NE1 1AA"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(503)));
        assert!(err.is_communication());
    }

    #[tokio::test]
    async fn test_garbage_body_is_json_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("not json");
            })
            .await;

        let err = fetcher_for(&server)
            .fetch_outages(&PostcodeQuery::new("NE1 1AA"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("[]").delay(Duration::from_millis(1500));
            })
            .await;

        let fetcher = PowerCutFetcher::new(
            FetchSettings::default()
                .with_endpoint(server.url("/getall"))
                .with_timeout(Duration::from_millis(200)),
        );

        let err = fetcher
            .fetch_outages(&PostcodeQuery::new("NE1 1AA"))
            .await
            .unwrap_err();

        assert!(err.is_communication());
    }

    #[tokio::test]
    async fn test_default_fetcher_refuses_other_domains() {
        let mut settings = FetchSettings::default();
        settings.endpoint = "https://example.com/getall".to_string();

        let err = PowerCutFetcher::new(settings)
            .fetch_outages(&PostcodeQuery::new("NE1 1AA"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::DomainNotAllowed(_)));
        assert!(!err.is_communication());
    }
}
