//! Config entries and preferences store.
//!
//! Manages settings with persistence and change notification.

use powercuts_core::consts::{API_ENDPOINT, DEFAULT_NAME, REQUEST_TIMEOUT, SCAN_INTERVAL};
use powercuts_core::{PostcodeQuery, normalize_postcode};
use powercuts_fetch::FetchSettings;
use powercuts_sensors::SensorContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Config Entries
// ============================================================================

/// Data captured when an entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    /// Postcode as entered.
    pub postcode: String,
    /// Base name for the entry's sensors.
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

/// Overrides set through the options flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryOptions {
    /// Replacement postcode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    /// Replacement name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One configured postcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Stable id; prefix of every sensor unique id.
    pub entry_id: String,
    /// Normalized postcode at creation time. At most one entry per value.
    pub unique_id: String,
    /// Display title.
    pub title: String,
    /// Creation data.
    pub data: EntryData,
    /// Options overriding `data`.
    #[serde(default)]
    pub options: EntryOptions,
}

impl ConfigEntry {
    /// Creates an entry from validated user input.
    pub fn new(postcode: &str, name: &str) -> Self {
        let unique_id = normalize_postcode(postcode);
        Self {
            entry_id: unique_id.to_lowercase(),
            unique_id,
            title: format!("Northern Powergrid {postcode}"),
            data: EntryData {
                postcode: postcode.to_string(),
                name: name.to_string(),
            },
            options: EntryOptions::default(),
        }
    }

    /// Postcode in effect, options first.
    pub fn postcode(&self) -> &str {
        self.options.postcode.as_deref().unwrap_or(&self.data.postcode)
    }

    /// Name in effect, options first.
    pub fn name(&self) -> &str {
        self.options.name.as_deref().unwrap_or(&self.data.name)
    }

    /// Normalized query for the postcode in effect.
    pub fn query(&self) -> PostcodeQuery {
        PostcodeQuery::new(self.postcode())
    }

    /// Identity for this entry's sensors.
    pub fn sensor_context(&self) -> SensorContext {
        SensorContext::new(&self.entry_id, self.name(), self.postcode())
    }
}

// ============================================================================
// Settings Types
// ============================================================================

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configured postcodes.
    pub entries: Vec<ConfigEntry>,

    /// Upstream endpoint.
    pub endpoint: String,

    /// Seconds between refreshes.
    pub scan_interval_secs: u64,

    /// Seconds allowed for one fetch.
    pub request_timeout_secs: u64,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            endpoint: API_ENDPOINT.to_string(),
            scan_interval_secs: SCAN_INTERVAL.as_secs(),
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Refresh interval.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    /// Fetch timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Fetch settings derived from these settings.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::default()
            .with_endpoint(self.endpoint.clone())
            .with_timeout(self.request_timeout())
    }

    /// Looks up an entry by id.
    pub fn entry(&self, entry_id: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.entry_id == entry_id)
    }

    /// Looks up an entry by unique id.
    pub fn entry_by_unique_id(&self, unique_id: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.unique_id == unique_id)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings store with persistence and change notification.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings, saved to `path`.
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults; an unreadable one is logged and
    /// replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json_or_default(&path).await
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        let store = Self::new(path);
        *store.settings.write().await = settings;
        Ok(store)
    }

    /// Path settings are saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Restores defaults, dropping every entry.
    pub async fn reset(&self) {
        self.update(|s| *s = Settings::default()).await;
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// All configured entries.
    pub async fn entries(&self) -> Vec<ConfigEntry> {
        self.settings.read().await.entries.clone()
    }

    /// Gets an entry by id.
    pub async fn entry(&self, entry_id: &str) -> Option<ConfigEntry> {
        self.settings.read().await.entry(entry_id).cloned()
    }

    /// Whether an entry with `unique_id` exists.
    pub async fn has_unique_id(&self, unique_id: &str) -> bool {
        self.settings
            .read()
            .await
            .entry_by_unique_id(unique_id)
            .is_some()
    }

    /// Adds an entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if its unique id is already configured.
    pub async fn add_entry(&self, entry: ConfigEntry) -> Result<(), StoreError> {
        {
            let mut settings = self.settings.write().await;
            if settings.entry_by_unique_id(&entry.unique_id).is_some() {
                return Err(StoreError::Config(format!(
                    "{} is already configured",
                    entry.unique_id
                )));
            }
            info!(entry_id = %entry.entry_id, "Config entry added");
            settings.entries.push(entry);
        }
        self.notify_change().await;
        Ok(())
    }

    /// Replaces an entry's options.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] for an unknown id.
    pub async fn set_options(&self, entry_id: &str, options: EntryOptions) -> Result<(), StoreError> {
        {
            let mut settings = self.settings.write().await;
            let entry = settings
                .entries
                .iter_mut()
                .find(|e| e.entry_id == entry_id)
                .ok_or_else(|| StoreError::EntryNotFound(entry_id.to_string()))?;
            entry.options = options;
        }
        self.notify_change().await;
        info!(entry_id, "Config entry options updated");
        Ok(())
    }

    /// Removes an entry, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] for an unknown id.
    pub async fn remove_entry(&self, entry_id: &str) -> Result<ConfigEntry, StoreError> {
        let removed = {
            let mut settings = self.settings.write().await;
            let pos = settings
                .entries
                .iter()
                .position(|e| e.entry_id == entry_id)
                .ok_or_else(|| StoreError::EntryNotFound(entry_id.to_string()))?;
            settings.entries.remove(pos)
        };
        self.notify_change().await;
        info!(entry_id, "Config entry removed");
        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry() {
        let entry = ConfigEntry::new("ne1 1aa", DEFAULT_NAME);
        assert_eq!(entry.unique_id, "NE11AA");
        assert_eq!(entry.entry_id, "ne11aa");
        assert_eq!(entry.title, "Northern Powergrid ne1 1aa");
        assert_eq!(entry.data.postcode, "ne1 1aa");
    }

    #[test]
    fn test_options_override_data() {
        let mut entry = ConfigEntry::new("NE1 1AA", "Home");
        entry.options = EntryOptions {
            postcode: Some("NE2 2BB".into()),
            name: None,
        };

        assert_eq!(entry.postcode(), "NE2 2BB");
        assert_eq!(entry.name(), "Home");
        assert_eq!(entry.query().as_str(), "NE22BB");

        let context = entry.sensor_context();
        assert_eq!(context.entry_id, "ne11aa");
        assert_eq!(context.postcode, "NE2 2BB");
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scan_interval(), Duration::from_secs(900));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.endpoint, API_ENDPOINT);
        assert!(settings.fetch_settings().allowed_domains.is_some());
    }

    #[test]
    fn test_entry_name_defaults_when_missing() {
        let json = r#"{"entry_id":"ne11aa","unique_id":"NE11AA","title":"t","data":{"postcode":"NE1 1AA"}}"#;
        let entry: ConfigEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name(), DEFAULT_NAME);
        assert_eq!(entry.options, EntryOptions::default());
    }

    #[tokio::test]
    async fn test_entry_lifecycle() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let mut rx = store.subscribe();

        store
            .add_entry(ConfigEntry::new("NE1 1AA", "Home"))
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(store.has_unique_id("NE11AA").await);

        let duplicate = store.add_entry(ConfigEntry::new("ne11aa", "Again")).await;
        assert!(matches!(duplicate, Err(StoreError::Config(_))));

        store
            .set_options(
                "ne11aa",
                EntryOptions {
                    name: Some("Office".into()),
                    ..EntryOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.entry("ne11aa").await.unwrap().name(), "Office");

        store.remove_entry("ne11aa").await.unwrap();
        assert!(store.entries().await.is_empty());
        assert!(matches!(
            store.remove_entry("ne11aa").await,
            Err(StoreError::EntryNotFound(_))
        ));
    }
}
