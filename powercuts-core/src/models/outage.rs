//! Outage records and postcode-filtered sets.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::ops::Index;

use super::postcode::PostcodeQuery;
use super::timestamp::Timestamp;

// ============================================================================
// Outage Record
// ============================================================================

/// One power cut as reported by the upstream API.
///
/// Field names follow the upstream JSON. Every field is optional on the
/// wire; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutageRecord {
    /// Incident reference, e.g. `INCD-12345-Z`.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub reference: Option<String>,

    /// Affected postcode(s) as free text.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub postcode: Option<String>,

    /// Number of customers confirmed off supply.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_confirmed_power_cut: Option<i64>,

    /// Customer-facing status message.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub customer_stage_sequence_message: Option<String>,

    /// Reason for the cut.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub reason: Option<String>,

    /// Planned / unplanned and similar.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub nature_of_outage: Option<String>,

    /// When the cut was logged.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub logged_time: Option<String>,

    /// Estimated restoration time.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub estimated_time_till_resolution: Option<String>,
}

/// Accepts integers, integral floats and numeric strings; anything else
/// becomes `None` instead of failing the whole payload.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accepts strings, numbers and booleans; arrays and objects become `None`
/// so one odd record cannot fail the whole payload.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

impl OutageRecord {
    /// True when this record's postcode contains `query`.
    pub fn matches(&self, query: &PostcodeQuery) -> bool {
        self.postcode
            .as_deref()
            .is_some_and(|postcode| query.matches(postcode))
    }

    /// Parsed `LoggedTime`.
    pub fn start_time(&self) -> Option<Timestamp> {
        self.logged_time.as_deref().and_then(Timestamp::parse)
    }

    /// Parsed `EstimatedTimeTillResolution`.
    pub fn estimated_restoration(&self) -> Option<Timestamp> {
        self.estimated_time_till_resolution
            .as_deref()
            .and_then(Timestamp::parse)
    }

    /// `LoggedTime` for ordering; missing values sort first.
    pub fn logged_time_key(&self) -> &str {
        self.logged_time.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Outage Set
// ============================================================================

/// Records matching one postcode, in upstream order.
///
/// Produced fresh on every refresh and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutageSet {
    records: Vec<OutageRecord>,
}

impl OutageSet {
    /// Wraps already-filtered records.
    pub fn new(records: Vec<OutageRecord>) -> Self {
        Self { records }
    }

    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keeps the records matching `query`, preserving their order.
    pub fn filtered<I>(records: I, query: &PostcodeQuery) -> Self
    where
        I: IntoIterator<Item = OutageRecord>,
    {
        Self {
            records: records.into_iter().filter(|r| r.matches(query)).collect(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no record matched.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if it still exists.
    pub fn get(&self, index: usize) -> Option<&OutageRecord> {
        self.records.get(index)
    }

    /// Iterates the records.
    pub fn iter(&self) -> std::slice::Iter<'_, OutageRecord> {
        self.records.iter()
    }

    /// The records as a slice.
    pub fn records(&self) -> &[OutageRecord] {
        &self.records
    }

    /// The record with the greatest `LoggedTime`, compared as strings.
    ///
    /// Ties go to the earliest record.
    pub fn latest_event(&self) -> Option<&OutageRecord> {
        self.records.iter().fold(None, |best, record| match best {
            Some(current) if record.logged_time_key() <= current.logged_time_key() => {
                Some(current)
            }
            _ => Some(record),
        })
    }
}

impl Index<usize> for OutageSet {
    type Output = OutageRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a OutageSet {
    type Item = &'a OutageRecord;
    type IntoIter = std::slice::Iter<'a, OutageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<OutageRecord> for OutageSet {
    fn from_iter<T: IntoIterator<Item = OutageRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference: &str, postcode: &str, logged: Option<&str>) -> OutageRecord {
        OutageRecord {
            reference: Some(reference.to_string()),
            postcode: Some(postcode.to_string()),
            logged_time: logged.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_upstream_fields() {
        let json = r#"{
            "Reference": "INCD-1",
            "Postcode": "NE1 1AA",
            "TotalConfirmedPowerCut": 12,
            "CustomerStageSequenceMessage": "Engineers on site",
            "Reason": "Fault",
            "NatureOfOutage": "Unplanned",
            "LoggedTime": "2024-01-01T09:00:00Z",
            "EstimatedTimeTillResolution": null,
            "SomethingElse": [1, 2, 3]
        }"#;

        let record: OutageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.reference.as_deref(), Some("INCD-1"));
        assert_eq!(record.total_confirmed_power_cut, Some(12));
        assert_eq!(record.nature_of_outage.as_deref(), Some("Unplanned"));
        assert!(record.estimated_time_till_resolution.is_none());
    }

    #[test]
    fn test_lenient_customer_count() {
        let from_string: OutageRecord =
            serde_json::from_str(r#"{"TotalConfirmedPowerCut": " 7 "}"#).unwrap();
        assert_eq!(from_string.total_confirmed_power_cut, Some(7));

        let from_float: OutageRecord =
            serde_json::from_str(r#"{"TotalConfirmedPowerCut": 3.0}"#).unwrap();
        assert_eq!(from_float.total_confirmed_power_cut, Some(3));

        let junk: OutageRecord =
            serde_json::from_str(r#"{"TotalConfirmedPowerCut": "many"}"#).unwrap();
        assert!(junk.total_confirmed_power_cut.is_none());

        let missing: OutageRecord = serde_json::from_str("{}").unwrap();
        assert!(missing.total_confirmed_power_cut.is_none());
    }

    #[test]
    fn test_lenient_text_fields() {
        let record: OutageRecord = serde_json::from_str(
            r#"{"Reference": 12345, "Postcode": "DH1 1AA", "Reason": {"code": 1}, "NatureOfOutage": true}"#,
        )
        .unwrap();
        assert_eq!(record.reference.as_deref(), Some("12345"));
        assert_eq!(record.postcode.as_deref(), Some("DH1 1AA"));
        assert!(record.reason.is_none());
        assert_eq!(record.nature_of_outage.as_deref(), Some("true"));
    }

    #[test]
    fn test_filtered_keeps_order() {
        let query = PostcodeQuery::new("NE1 1AA");
        let set = OutageSet::filtered(
            vec![
                record("A", "NE1 1AA", None),
                record("B", "NE2 2BB", None),
                record("C", "ne11aa", None),
            ],
            &query,
        );

        let refs: Vec<_> = set.iter().map(|r| r.reference.as_deref().unwrap()).collect();
        assert_eq!(refs, vec!["A", "C"]);
    }

    #[test]
    fn test_missing_postcode_never_matches() {
        let query = PostcodeQuery::new("NE1");
        let no_postcode = OutageRecord {
            reference: Some("X".to_string()),
            ..Default::default()
        };
        assert!(!no_postcode.matches(&query));
    }

    #[test]
    fn test_latest_event_by_logged_time() {
        let set = OutageSet::new(vec![
            record("old", "NE1", Some("2024-01-01T09:00:00Z")),
            record("new", "NE1", Some("2024-01-02T09:00:00Z")),
            record("none", "NE1", None),
        ]);

        let latest = set.latest_event().unwrap();
        assert_eq!(latest.reference.as_deref(), Some("new"));
    }

    #[test]
    fn test_latest_event_tie_goes_to_first() {
        let set = OutageSet::new(vec![
            record("first", "NE1", Some("2024-01-01T09:00:00Z")),
            record("second", "NE1", Some("2024-01-01T09:00:00Z")),
        ]);

        assert_eq!(set.latest_event().unwrap().reference.as_deref(), Some("first"));
        assert!(OutageSet::empty().latest_event().is_none());
    }

    #[test]
    fn test_parsed_times() {
        let r = OutageRecord {
            logged_time: Some("2024-01-01T10:00:00Z".to_string()),
            estimated_time_till_resolution: Some("soon".to_string()),
            ..Default::default()
        };

        assert_eq!(
            r.start_time().unwrap().to_iso_string(),
            "2024-01-01T10:00:00+00:00"
        );
        assert!(r.estimated_restoration().is_none());
    }
}
