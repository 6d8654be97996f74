//! Device grouping.

use powercuts_core::consts::{DOMAIN, MANUFACTURER};
use serde::Serialize;

/// Device an entity is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, id)` pairs identifying the device.
    pub identifiers: Vec<(String, String)>,
    /// Display name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// Parent device identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_device: Option<(String, String)>,
}

impl DeviceInfo {
    /// Device for a config entry: one per configured postcode.
    pub fn entry(entry_id: &str, postcode: &str) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), entry_id.to_string())],
            name: format!("Northern Powergrid {postcode}"),
            manufacturer: MANUFACTURER.to_string(),
            model: "Power Cuts API".to_string(),
            via_device: None,
        }
    }

    /// Device for the power cut at `index`, attached to the entry device.
    ///
    /// `reference` is empty once the index is gone.
    pub fn power_cut(entry_id: &str, index: usize, reference: &str) -> Self {
        Self {
            identifiers: vec![(
                DOMAIN.to_string(),
                format!("{entry_id}_power_cut_{index}"),
            )],
            name: format!("Power Cut {reference}").trim_end().to_string(),
            manufacturer: MANUFACTURER.to_string(),
            model: "Power Cut".to_string(),
            via_device: Some((DOMAIN.to_string(), entry_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_cut_device_links_to_entry() {
        let device = DeviceInfo::power_cut("ne11aa", 0, "INCD-1");
        assert_eq!(device.name, "Power Cut INCD-1");
        assert_eq!(
            device.via_device,
            Some((DOMAIN.to_string(), "ne11aa".to_string()))
        );
        assert_eq!(device.identifiers[0].1, "ne11aa_power_cut_0");
    }

    #[test]
    fn test_entry_device() {
        let device = DeviceInfo::entry("ne11aa", "NE1 1AA");
        assert_eq!(device.name, "Northern Powergrid NE1 1AA");
        assert_eq!(device.model, "Power Cuts API");
        assert!(device.via_device.is_none());
    }
}
