// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Powercuts Sensors
//!
//! Sensor entities projected from a [`CoordinatorSnapshot`].
//!
//! Every sensor is a [`SensorEntity`] tagged with a [`SensorKind`]. All
//! state, attributes and availability are pure functions of the snapshot
//! passed in, so a sensor never holds data of its own.
//!
//! - [`descriptor`] - Per-record fields and sensor kinds
//! - [`entity`] - The entity type and its rendered [`EntityState`]
//! - [`device`] - Device grouping
//! - [`registry`] - Fan-out of entities as new power cuts appear
//!
//! [`CoordinatorSnapshot`]: powercuts_core::CoordinatorSnapshot

pub mod descriptor;
pub mod device;
pub mod entity;
pub mod registry;

pub use descriptor::{OutageField, SensorKind, StateClass};
pub use device::DeviceInfo;
pub use entity::{EntityState, SensorContext, SensorEntity, SensorValue};
pub use registry::EntityRegistry;
