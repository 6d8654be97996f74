//! Sensor descriptors.
//!
//! A descriptor holds the static configuration of a sensor:
//! - Key used in unique ids
//! - Display label
//! - Icon, device class and state class

use serde::Serialize;
use std::fmt;

// ============================================================================
// State Class
// ============================================================================

/// How a numeric sensor's state should be interpreted over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    /// A current reading, e.g. affected customers.
    Measurement,
}

// ============================================================================
// Outage Field
// ============================================================================

/// A field of a single power cut exposed as its own sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutageField {
    /// Incident reference.
    Reference,
    /// Number of affected customers.
    AffectedCustomers,
    /// Customer-facing status message.
    Status,
    /// Reason for the power cut.
    Reason,
    /// When the power cut was logged.
    StartTime,
    /// Estimated restoration time.
    EstimatedRestoration,
    /// Nature of the outage (planned, unplanned, ...).
    Nature,
}

impl OutageField {
    /// All fields, in registration order.
    pub const ALL: [OutageField; 7] = [
        OutageField::Reference,
        OutageField::AffectedCustomers,
        OutageField::Status,
        OutageField::Reason,
        OutageField::StartTime,
        OutageField::EstimatedRestoration,
        OutageField::Nature,
    ];

    /// Key used in unique ids.
    pub fn key(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::AffectedCustomers => "affected_customers",
            Self::Status => "status",
            Self::Reason => "reason",
            Self::StartTime => "start_time",
            Self::EstimatedRestoration => "estimated_restoration",
            Self::Nature => "nature",
        }
    }

    /// Label appended to the sensor name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Reference => "Reference",
            Self::AffectedCustomers => "Affected Customers",
            Self::Status => "Status",
            Self::Reason => "Reason",
            Self::StartTime => "Start Time",
            Self::EstimatedRestoration => "Estimated Restoration",
            Self::Nature => "Nature",
        }
    }

    /// Material Design icon.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Reference => "mdi:pound",
            Self::AffectedCustomers => "mdi:account-group",
            Self::Status => "mdi:information-outline",
            Self::Reason => "mdi:help-circle-outline",
            Self::StartTime => "mdi:clock-start",
            Self::EstimatedRestoration => "mdi:clock-end",
            Self::Nature => "mdi:flash-alert",
        }
    }

    /// Device class, set for timestamp fields only.
    pub fn device_class(self) -> Option<&'static str> {
        match self {
            Self::StartTime | Self::EstimatedRestoration => Some("timestamp"),
            _ => None,
        }
    }

    /// State class, set for affected customers only.
    pub fn state_class(self) -> Option<StateClass> {
        match self {
            Self::AffectedCustomers => Some(StateClass::Measurement),
            _ => None,
        }
    }

    /// Whether the state is a parsed timestamp.
    pub fn is_timestamp(self) -> bool {
        self.device_class() == Some("timestamp")
    }
}

impl fmt::Display for OutageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Sensor Kind
// ============================================================================

/// What a sensor projects from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Number of active power cuts for the postcode.
    Count,
    /// One field of the power cut at `index` in the current set.
    Field {
        /// Zero-based position in the filtered set.
        index: usize,
        /// Which field.
        field: OutageField,
    },
    /// Reference of the most recently logged power cut.
    LatestEvent,
}

impl SensorKind {
    /// Index of the power cut this sensor follows, if any.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Field { index, .. } => Some(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_metadata() {
        assert_eq!(OutageField::ALL.len(), 7);
        assert_eq!(OutageField::AffectedCustomers.key(), "affected_customers");
        assert_eq!(OutageField::Nature.icon(), "mdi:flash-alert");
        assert_eq!(
            OutageField::AffectedCustomers.state_class(),
            Some(StateClass::Measurement)
        );
        assert!(OutageField::StartTime.is_timestamp());
        assert!(OutageField::EstimatedRestoration.is_timestamp());
        assert!(!OutageField::Reference.is_timestamp());
    }

    #[test]
    fn test_kind_index() {
        let kind = SensorKind::Field {
            index: 3,
            field: OutageField::Status,
        };
        assert_eq!(kind.index(), Some(3));
        assert_eq!(SensorKind::Count.index(), None);
    }
}
