// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Powercuts Store
//!
//! State management for `powercuts`.
//!
//! This crate provides:
//!
//! - **UpdateCoordinator**: Refreshes one config entry and holds its last
//!   known data, with watch channels for change notification
//! - **SettingsStore**: Config entries and preferences with persistence
//! - **ConfigFlow / OptionsFlow**: Validated creation and editing of entries
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use powercuts_fetch::PowerCutFetcher;
//! use powercuts_store::{SettingsStore, UpdateCoordinator};
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let entry = &settings.entries[0];
//!
//! let coordinator = UpdateCoordinator::for_entry(
//!     entry,
//!     PowerCutFetcher::new(settings.fetch_settings()),
//! );
//! coordinator.refresh().await?;
//!
//! let mut rx = coordinator.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{} power cuts", coordinator.snapshot().await.len());
//! }
//! ```

pub mod config_flow;
pub mod coordinator;
pub mod error;
pub mod persistence;
pub mod settings_store;

pub use config_flow::{ConfigFlow, FlowErrors, FlowResult, OptionsFlow, UserInput};
pub use coordinator::UpdateCoordinator;
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_settings_path, ensure_dir, load_json, load_json_or_default,
    save_json,
};
pub use settings_store::{ConfigEntry, EntryData, EntryOptions, LogLevel, Settings, SettingsStore};
