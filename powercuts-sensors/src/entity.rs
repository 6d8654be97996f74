//! Sensor entities and their rendered state.

use powercuts_core::consts::ATTRIBUTION;
use powercuts_core::{CoordinatorSnapshot, OutageRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::descriptor::{OutageField, SensorKind, StateClass};
use crate::device::DeviceInfo;

// ============================================================================
// Context
// ============================================================================

/// Identity shared by every sensor of one config entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorContext {
    /// Config entry id; prefix of every unique id.
    pub entry_id: String,
    /// User-facing base name.
    pub name: String,
    /// Postcode as configured (not normalized).
    pub postcode: String,
}

impl SensorContext {
    /// Creates a context.
    pub fn new(
        entry_id: impl Into<String>,
        name: impl Into<String>,
        postcode: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            name: name.into(),
            postcode: postcode.into(),
        }
    }
}

// ============================================================================
// Sensor Value
// ============================================================================

/// State of a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// Text state (references, messages, timestamps, the count).
    Text(String),
    /// Integer state (affected customers).
    Integer(i64),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for SensorValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ============================================================================
// Entity State
// ============================================================================

/// Everything a host needs to display one sensor at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    /// Stable unique id.
    pub unique_id: String,
    /// Display name.
    pub name: String,
    /// Current state; `None` renders as unknown.
    pub state: Option<SensorValue>,
    /// Whether the host should show the state at all.
    pub available: bool,
    /// Material Design icon.
    pub icon: &'static str,
    /// Device class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    /// State class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    /// Extra state attributes.
    pub attributes: Map<String, Value>,
    /// Data attribution.
    pub attribution: &'static str,
    /// Device this entity belongs to.
    pub device: DeviceInfo,
}

// ============================================================================
// Sensor Entity
// ============================================================================

/// A sensor bound to one config entry.
///
/// Holds no data: every accessor takes the snapshot it projects from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorEntity {
    kind: SensorKind,
    context: SensorContext,
}

impl SensorEntity {
    /// Creates a sensor of `kind` for the entry described by `context`.
    pub fn new(kind: SensorKind, context: SensorContext) -> Self {
        Self { kind, context }
    }

    /// The count sensor.
    pub fn count(context: SensorContext) -> Self {
        Self::new(SensorKind::Count, context)
    }

    /// A per-index field sensor.
    pub fn field(context: SensorContext, index: usize, field: OutageField) -> Self {
        Self::new(SensorKind::Field { index, field }, context)
    }

    /// The latest event sensor.
    pub fn latest_event(context: SensorContext) -> Self {
        Self::new(SensorKind::LatestEvent, context)
    }

    /// What this sensor projects.
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Stable unique id.
    pub fn unique_id(&self) -> String {
        let entry_id = &self.context.entry_id;
        match self.kind {
            SensorKind::Count => format!("{entry_id}_count"),
            SensorKind::Field { index, field } => {
                format!("{entry_id}_power_cut_{index}_{}", field.key())
            }
            SensorKind::LatestEvent => format!("{entry_id}_latest_event"),
        }
    }

    /// Display name.
    pub fn name(&self) -> String {
        let name = &self.context.name;
        match self.kind {
            SensorKind::Count => name.clone(),
            SensorKind::Field { index, field } => {
                format!("{name} power_cut_{} {}", index + 1, field.label())
            }
            SensorKind::LatestEvent => format!("{name} Latest Event"),
        }
    }

    /// Material Design icon.
    pub fn icon(&self, snapshot: &CoordinatorSnapshot) -> &'static str {
        match self.kind {
            SensorKind::Count if snapshot.is_empty() => "mdi:flash",
            SensorKind::Count => "mdi:flash-off",
            SensorKind::Field { field, .. } => field.icon(),
            SensorKind::LatestEvent => "mdi:alert",
        }
    }

    /// Device class.
    pub fn device_class(&self) -> Option<&'static str> {
        match self.kind {
            SensorKind::Field { field, .. } => field.device_class(),
            _ => None,
        }
    }

    /// State class.
    pub fn state_class(&self) -> Option<StateClass> {
        match self.kind {
            SensorKind::Field { field, .. } => field.state_class(),
            _ => None,
        }
    }

    /// The record this sensor currently describes, if any.
    fn record<'a>(&self, snapshot: &'a CoordinatorSnapshot) -> Option<&'a OutageRecord> {
        match self.kind {
            SensorKind::Count => None,
            SensorKind::Field { index, .. } => snapshot.record(index),
            SensorKind::LatestEvent => snapshot.latest_event(),
        }
    }

    /// Current state.
    pub fn state(&self, snapshot: &CoordinatorSnapshot) -> Option<SensorValue> {
        match self.kind {
            SensorKind::Count => Some(SensorValue::Text(snapshot.len().to_string())),
            SensorKind::Field { field, .. } => {
                self.record(snapshot).and_then(|r| field_value(r, field))
            }
            SensorKind::LatestEvent => self
                .record(snapshot)
                .and_then(|r| r.reference.as_deref())
                .map(SensorValue::from),
        }
    }

    /// Extra state attributes.
    pub fn attributes(&self, snapshot: &CoordinatorSnapshot) -> Map<String, Value> {
        match self.kind {
            SensorKind::Count => {
                let mut attrs = Map::new();
                attrs.insert(
                    "postcode".to_string(),
                    Value::String(self.context.postcode.clone()),
                );
                attrs
            }
            _ => self.record(snapshot).map(record_attributes).unwrap_or_default(),
        }
    }

    /// Whether the host should show this sensor's state.
    pub fn available(&self, snapshot: &CoordinatorSnapshot) -> bool {
        match self.kind {
            SensorKind::Count => snapshot.has_data(),
            SensorKind::Field { index, .. } => {
                snapshot.last_update_success && index < snapshot.len()
            }
            SensorKind::LatestEvent => !snapshot.is_empty(),
        }
    }

    /// Device this sensor belongs to.
    pub fn device_info(&self, snapshot: &CoordinatorSnapshot) -> DeviceInfo {
        let entry_id = &self.context.entry_id;
        match self.kind {
            SensorKind::Field { index, .. } => {
                let reference = snapshot
                    .record(index)
                    .and_then(|r| r.reference.as_deref())
                    .unwrap_or("");
                DeviceInfo::power_cut(entry_id, index, reference)
            }
            _ => DeviceInfo::entry(entry_id, &self.context.postcode),
        }
    }

    /// Renders every property against `snapshot`.
    pub fn render(&self, snapshot: &CoordinatorSnapshot) -> EntityState {
        EntityState {
            unique_id: self.unique_id(),
            name: self.name(),
            state: self.state(snapshot),
            available: self.available(snapshot),
            icon: self.icon(snapshot),
            device_class: self.device_class(),
            state_class: self.state_class(),
            attributes: self.attributes(snapshot),
            attribution: ATTRIBUTION,
            device: self.device_info(snapshot),
        }
    }
}

// ============================================================================
// Projections
// ============================================================================

fn text(value: Option<&String>) -> Option<SensorValue> {
    value.map(|s| SensorValue::Text(s.clone()))
}

/// State of `field` for `record`. Timestamps are normalized; unparseable
/// ones become `None`.
fn field_value(record: &OutageRecord, field: OutageField) -> Option<SensorValue> {
    match field {
        OutageField::Reference => text(record.reference.as_ref()),
        OutageField::AffectedCustomers => record.total_confirmed_power_cut.map(SensorValue::Integer),
        OutageField::Status => text(record.customer_stage_sequence_message.as_ref()),
        OutageField::Reason => text(record.reason.as_ref()),
        OutageField::Nature => text(record.nature_of_outage.as_ref()),
        OutageField::StartTime => record
            .start_time()
            .map(|ts| SensorValue::Text(ts.to_iso_string())),
        OutageField::EstimatedRestoration => record
            .estimated_restoration()
            .map(|ts| SensorValue::Text(ts.to_iso_string())),
    }
}

/// Raw attributes shared by per-index and latest event sensors.
fn record_attributes(record: &OutageRecord) -> Map<String, Value> {
    let raw = |value: Option<&String>| value.map_or(Value::Null, |s| Value::String(s.clone()));

    let mut attrs = Map::new();
    attrs.insert("start_time".to_string(), raw(record.logged_time.as_ref()));
    attrs.insert(
        "estimated_restoration".to_string(),
        raw(record.estimated_time_till_resolution.as_ref()),
    );
    attrs.insert(
        "status".to_string(),
        raw(record.customer_stage_sequence_message.as_ref()),
    );
    attrs.insert("reason".to_string(), raw(record.reason.as_ref()));
    attrs.insert("nature".to_string(), raw(record.nature_of_outage.as_ref()));
    attrs
}

// ============================================================================
// Tests
// ============================================================================
