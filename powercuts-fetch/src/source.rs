//! Outage source trait.

use async_trait::async_trait;
use powercuts_core::{OutageSet, PostcodeQuery};

use crate::error::FetchError;

/// Something the coordinator can refresh from.
///
/// ```ignore
/// struct Fixed(OutageSet);
///
/// #[async_trait]
/// impl OutageSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn fetch_outages(&self, _query: &PostcodeQuery) -> Result<OutageSet, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait OutageSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetches the current outages matching `query`.
    ///
    /// Either returns the complete filtered set or fails; never a partial set.
    async fn fetch_outages(&self, query: &PostcodeQuery) -> Result<OutageSet, FetchError>;
}
