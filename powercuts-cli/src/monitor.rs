//! Per-entry refresh loop state shared by `status` and `watch`.

use chrono::{DateTime, Utc};
use powercuts_fetch::PowerCutFetcher;
use powercuts_sensors::{EntityRegistry, EntityState};
use powercuts_store::{ConfigEntry, Settings, UpdateCoordinator};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// One config entry with its coordinator and sensors.
pub struct EntryMonitor {
    entry: ConfigEntry,
    coordinator: UpdateCoordinator<PowerCutFetcher>,
    changes: watch::Receiver<u64>,
    registry: Option<EntityRegistry>,
}

/// Result of refreshing one entry, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    /// Config entry id.
    pub entry_id: String,
    /// Entry title.
    pub title: String,
    /// Postcode in effect.
    pub postcode: String,
    /// Number of known power cuts.
    pub power_cuts: usize,
    /// Whether the latest refresh succeeded.
    pub last_update_success: bool,
    /// When data was last replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the latest failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every registered sensor.
    pub entities: Vec<EntityState>,
}

impl EntryMonitor {
    /// Creates a monitor for `entry` using the fetch settings in `settings`.
    pub fn new(entry: ConfigEntry, settings: &Settings) -> Self {
        let coordinator =
            UpdateCoordinator::for_entry(&entry, PowerCutFetcher::new(settings.fetch_settings()))
                .with_update_interval(settings.scan_interval());
        let changes = coordinator.subscribe();
        Self {
            entry,
            coordinator,
            changes,
            registry: None,
        }
    }

    /// How often this entry wants refreshing.
    pub fn update_interval(&self) -> Duration {
        self.coordinator.update_interval()
    }

    /// Refreshes once, registers any new sensors and renders them.
    ///
    /// A failed refresh still produces a report showing the last known data.
    /// The registry is only re-synced when the coordinator reports a change.
    pub async fn refresh(&mut self) -> EntryReport {
        // Failure is already recorded in the snapshot.
        let _ = self.coordinator.refresh().await;
        let changed = self.changes.has_changed().unwrap_or(false);
        let version = *self.changes.borrow_and_update();
        let snapshot = self.coordinator.snapshot().await;

        match &mut self.registry {
            Some(registry) if changed => {
                registry.sync(&snapshot);
            }
            Some(_) => {
                debug!(entry_id = %self.entry.entry_id, version, "Coordinator unchanged");
            }
            None => {
                self.registry = Some(EntityRegistry::setup(
                    self.entry.sensor_context(),
                    &snapshot,
                ));
            }
        }

        let entities = self
            .registry
            .as_ref()
            .map(|r| r.render(&snapshot))
            .unwrap_or_default();

        debug!(entry_id = %self.entry.entry_id, entities = entities.len(), "Rendered entry");

        EntryReport {
            entry_id: self.entry.entry_id.clone(),
            title: self.entry.title.clone(),
            postcode: self.entry.postcode().to_string(),
            power_cuts: snapshot.len(),
            last_update_success: snapshot.last_update_success,
            last_updated: snapshot.last_updated,
            error: snapshot.last_error.clone(),
            entities,
        }
    }
}
