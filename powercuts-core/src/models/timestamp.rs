//! Timestamp parsing for the `LoggedTime` and `EstimatedTimeTillResolution`
//! fields.
//!
//! The upstream API is inconsistent: most values are RFC 3339 with a `Z`
//! suffix, some carry no offset at all and a few are bare dates. Parsing is
//! lenient and the normalized output always uses a `T` separator, a
//! `+HH:MM` offset for offset-aware values and microsecond precision only
//! when the fractional part is non-zero.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Offset-aware formats tried after RFC 3339.
const AWARE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed upstream timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Timestamp with a UTC offset.
    Aware(DateTime<FixedOffset>),
    /// Timestamp without offset information.
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Parses a raw field value. Returns `None` for empty or unparseable input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Aware(dt));
        }

        for format in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(Self::Aware(dt));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self::Naive(dt));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| Self::Naive(date.and_time(NaiveTime::MIN)))
    }

    /// Normalized ISO-8601 representation.
    pub fn to_iso_string(&self) -> String {
        match self {
            Self::Aware(dt) => format!("{}{}", format_naive(&dt.naive_local()), dt.format("%:z")),
            Self::Naive(dt) => format_naive(dt),
        }
    }

    /// The instant in UTC, if the timestamp carries an offset.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Aware(dt) => Some(dt.with_timezone(&Utc)),
            Self::Naive(_) => None,
        }
    }

    /// True if an offset was present in the input.
    pub fn is_aware(&self) -> bool {
        matches!(self, Self::Aware(_))
    }
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let micros = (dt.nanosecond() / 1_000) % 1_000_000;
    let base = dt.format("%Y-%m-%dT%H:%M:%S");
    if micros == 0 {
        base.to_string()
    } else {
        format!("{base}.{micros:06}")
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for Timestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidTimestamp(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}
