//! Payload parsing.

use powercuts_core::{OutageRecord, OutageSet, PostcodeQuery};
use tracing::{debug, warn};

use crate::error::FetchError;

/// Decodes the raw body into records.
///
/// The endpoint declares `text/plain`, so the body is decoded here rather
/// than through `Response::json`.
pub fn parse_records(body: &str) -> Result<Vec<OutageRecord>, FetchError> {
    debug!(len = body.len(), "Parsing power cut payload");

    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Failed to parse power cut payload");
        FetchError::Json(e)
    })
}

/// Decodes the body and keeps the records matching `query`.
pub fn parse_outages(body: &str, query: &PostcodeQuery) -> Result<OutageSet, FetchError> {
    let records = parse_records(body)?;
    let total = records.len();
    let set = OutageSet::filtered(records, query);
    debug!(total, matched = set.len(), postcode = %query, "Filtered power cuts");
    Ok(set)
}
