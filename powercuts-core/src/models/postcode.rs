//! Postcode normalization and matching.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::{MAX_POSTCODE_LENGTH, MIN_POSTCODE_LENGTH};
use crate::error::CoreError;

/// Uppercases a postcode and strips every whitespace character.
///
/// ```
/// assert_eq!(powercuts_core::normalize_postcode(" ne1 1aa "), "NE11AA");
/// ```
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// A normalized postcode.
///
/// Used both to match upstream records (substring match) and as the
/// unique id of a config entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostcodeQuery(String);

impl PostcodeQuery {
    /// Normalizes `raw` into a query. No length validation is performed.
    pub fn new(raw: &str) -> Self {
        Self(normalize_postcode(raw))
    }

    /// Normalizes and validates the length (5 to 7 characters).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let query = Self::new(raw);
        query.validate()?;
        Ok(query)
    }

    /// Checks the normalized length.
    pub fn validate(&self) -> Result<(), CoreError> {
        let length = self.len();
        if (MIN_POSTCODE_LENGTH..=MAX_POSTCODE_LENGTH).contains(&length) {
            Ok(())
        } else {
            Err(CoreError::InvalidPostcode {
                postcode: self.0.clone(),
                length,
                min: MIN_POSTCODE_LENGTH,
                max: MAX_POSTCODE_LENGTH,
            })
        }
    }

    /// The normalized postcode.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// True for an empty query.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the normalized `candidate` contains this query.
    ///
    /// Empty candidates never match.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = normalize_postcode(candidate);
        !candidate.is_empty() && candidate.contains(self.0.as_str())
    }
}

impl fmt::Display for PostcodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostcodeQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
