//! Domain models for `powercuts`.
//!
//! ## Submodules
//!
//! - [`outage`] - Outage records and filtered sets
//! - [`postcode`] - Postcode normalization and matching
//! - [`timestamp`] - Lenient ISO-8601 parsing and normalized output
//! - [`snapshot`] - Coordinator snapshot consumed by sensors

mod outage;
mod postcode;
mod snapshot;
mod timestamp;

pub use outage::{OutageRecord, OutageSet};
pub use postcode::{PostcodeQuery, normalize_postcode};
pub use snapshot::CoordinatorSnapshot;
pub use timestamp::Timestamp;
