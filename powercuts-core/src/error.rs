//! Core error types for `powercuts`.

use thiserror::Error;

/// Core error type for `powercuts` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Postcode is too short or too long once normalized.
    #[error("Invalid postcode '{postcode}': expected {min}-{max} characters, got {length}")]
    InvalidPostcode {
        /// The normalized postcode.
        postcode: String,
        /// Its length in characters.
        length: usize,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Timestamp could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
