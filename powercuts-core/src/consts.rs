//! Constants shared by every `powercuts` crate.

use std::time::Duration;

/// Integration domain, used in device identifiers.
pub const DOMAIN: &str = "northern_powergrid_power_cuts";

/// Attribution attached to every entity.
pub const ATTRIBUTION: &str = "Data provided by Northern Powergrid";

/// Manufacturer reported in device info.
pub const MANUFACTURER: &str = "Northern Powergrid";

/// Entry name used when the user does not provide one.
pub const DEFAULT_NAME: &str = "Northern Powergrid Power Cut";

/// Endpoint returning every current power cut.
pub const API_ENDPOINT: &str =
    "https://power.northernpowergrid.com/Powercut_API/rest/powercuts/getall";

/// Domain the HTTP client is allowed to talk to by default.
pub const API_DOMAIN: &str = "northernpowergrid.com";

/// How often the coordinator refreshes.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Budget for a single fetch (request plus body).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest accepted normalized postcode.
pub const MIN_POSTCODE_LENGTH: usize = 5;

/// Longest accepted normalized postcode.
pub const MAX_POSTCODE_LENGTH: usize = 7;
