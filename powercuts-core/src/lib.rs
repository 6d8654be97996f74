// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Powercuts Core
//!
//! Core types and models for monitoring Northern Powergrid power cuts.
//!
//! This crate provides the foundational abstractions used across all other
//! `powercuts` crates:
//!
//! - Domain models (outage records, filtered sets, postcodes, timestamps)
//! - The coordinator snapshot that sensors project from
//! - Error types
//! - Shared constants (endpoint, intervals, attribution)
//!
//! ## Key Types
//!
//! - [`OutageRecord`] - One power cut as returned by the upstream API
//! - [`OutageSet`] - Records matching a postcode, in upstream order
//! - [`PostcodeQuery`] - Normalized postcode used for matching and identity
//! - [`Timestamp`] - Parsed `LoggedTime` / `EstimatedTimeTillResolution`
//! - [`CoordinatorSnapshot`] - Immutable view of the last known data

pub mod consts;
pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    CoordinatorSnapshot, OutageRecord, OutageSet, PostcodeQuery, Timestamp, normalize_postcode,
};
