// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Powercuts Fetch
//!
//! Fetching and filtering of Northern Powergrid power cut data.
//!
//! - [`http::HttpClient`] - HTTP client with tracing and domain allowlist
//! - [`settings::FetchSettings`] - Endpoint, timeout and allowlist
//! - [`source::OutageSource`] - Trait the coordinator refreshes through
//! - [`fetcher::PowerCutFetcher`] - GET + decode + postcode filter
//! - [`parser`] - Payload decoding (the API serves JSON as `text/plain`)
//! - [`probe::Probe`] - Reachability check used by the config flow
//!
//! ## Example
//!
//! ```ignore
//! use powercuts_core::PostcodeQuery;
//! use powercuts_fetch::{FetchSettings, OutageSource, PowerCutFetcher};
//!
//! let fetcher = PowerCutFetcher::new(FetchSettings::default());
//! let outages = fetcher.fetch_outages(&PostcodeQuery::new("NE1 1AA")).await?;
//! println!("{} active power cuts", outages.len());
//! ```

pub mod error;
pub mod fetcher;
pub mod http;
pub mod parser;
pub mod probe;
pub mod settings;
pub mod source;

pub use error::{FetchError, HttpError};
pub use fetcher::PowerCutFetcher;
pub use http::HttpClient;
pub use parser::{parse_outages, parse_records};
pub use probe::{Probe, ProbeOutcome, ProbeResult};
pub use settings::FetchSettings;
pub use source::OutageSource;
