//! Config and options flows.
//!
//! The config flow validates a postcode, checks the endpoint is reachable
//! and creates a [`ConfigEntry`]. The options flow edits an existing entry.
//! Validation problems come back as form errors keyed by field (or `base`),
//! never as a silent failure.

use powercuts_core::PostcodeQuery;
use powercuts_core::consts::DEFAULT_NAME;
use powercuts_fetch::{HttpClient, Probe, ProbeOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::settings_store::{ConfigEntry, EntryOptions, Settings, SettingsStore};

/// Form errors, keyed by field name or `base`.
pub type FlowErrors = BTreeMap<String, String>;

/// Error key for errors not tied to one field.
const BASE: &str = "base";

// ============================================================================
// Types
// ============================================================================

/// What the user typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    /// Postcode, any spacing or case.
    pub postcode: String,
    /// Optional base name for sensors.
    pub name: Option<String>,
}

impl UserInput {
    /// Input with a postcode and no name.
    pub fn postcode(postcode: impl Into<String>) -> Self {
        Self {
            postcode: postcode.into(),
            name: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn name_or_default(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_NAME,
        }
    }
}

/// Outcome of a flow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowResult {
    /// A new entry was created.
    CreateEntry {
        /// The stored entry.
        entry: ConfigEntry,
    },
    /// An entry's options were replaced.
    UpdateEntry {
        /// The entry with its new options.
        entry: ConfigEntry,
    },
    /// The form must be shown again with errors.
    ShowForm {
        /// Step to show.
        step_id: &'static str,
        /// Errors by field.
        errors: FlowErrors,
    },
    /// The flow cannot continue.
    Abort {
        /// Reason code.
        reason: String,
    },
}

impl FlowResult {
    fn form(step_id: &'static str, errors: FlowErrors) -> Self {
        Self::ShowForm { step_id, errors }
    }

    fn abort(reason: &str) -> Self {
        Self::Abort {
            reason: reason.to_string(),
        }
    }
}

fn length_errors(postcode: &str) -> FlowErrors {
    let mut errors = FlowErrors::new();
    if let Err(e) = PostcodeQuery::new(postcode).validate() {
        debug!(error = %e, "Rejected postcode");
        errors.insert("postcode".to_string(), "invalid_postcode".to_string());
    }
    errors
}

// ============================================================================
// Config Flow
// ============================================================================

/// Creates config entries.
#[derive(Debug, Clone)]
pub struct ConfigFlow {
    client: HttpClient,
    endpoint: String,
    probe_timeout: Duration,
}

impl ConfigFlow {
    /// Creates a flow probing the endpoint configured in `settings`.
    pub fn new(settings: &Settings) -> Self {
        let fetch = settings.fetch_settings();
        Self {
            client: fetch.build_client(),
            probe_timeout: fetch.timeout,
            endpoint: fetch.endpoint,
        }
    }

    /// Validates `input`, returning the errors to show.
    ///
    /// The endpoint is probed only when the postcode length is acceptable.
    pub async fn validate(&self, input: &UserInput) -> FlowErrors {
        let mut errors = length_errors(&input.postcode);
        if !errors.is_empty() {
            return errors;
        }

        let result = Probe::new(&self.endpoint)
            .with_timeout(self.probe_timeout)
            .check(&self.client)
            .await;

        match result.outcome {
            ProbeOutcome::Reachable => {}
            ProbeOutcome::BadStatus(status) => {
                debug!(status, "Endpoint returned an error status");
                errors.insert(BASE.to_string(), "cannot_connect".to_string());
            }
            ProbeOutcome::Unreachable(reason) => {
                debug!(%reason, "Endpoint unreachable");
                errors.insert(BASE.to_string(), "cannot_connect".to_string());
            }
            ProbeOutcome::Unexpected(reason) => {
                error!(%reason, "Unexpected exception");
                errors.insert(BASE.to_string(), "unknown".to_string());
            }
        }
        errors
    }

    /// Runs the user step, adding the entry to `store` on success.
    pub async fn step_user(&self, store: &SettingsStore, input: UserInput) -> FlowResult {
        let errors = self.validate(&input).await;
        if !errors.is_empty() {
            return FlowResult::form("user", errors);
        }

        let entry = ConfigEntry::new(&input.postcode, input.name_or_default());
        if store.has_unique_id(&entry.unique_id).await {
            info!(unique_id = %entry.unique_id, "Postcode already configured");
            return FlowResult::abort("already_configured");
        }

        match store.add_entry(entry.clone()).await {
            Ok(()) => FlowResult::CreateEntry { entry },
            Err(_) => FlowResult::abort("already_configured"),
        }
    }
}

// ============================================================================
// Options Flow
// ============================================================================

/// Edits an existing entry's postcode and name.
#[derive(Debug, Clone)]
pub struct OptionsFlow {
    entry_id: String,
}

impl OptionsFlow {
    /// Options flow for `entry_id`.
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
        }
    }

    /// Form defaults: the entry's current values.
    pub fn defaults(entry: &ConfigEntry) -> UserInput {
        UserInput::postcode(entry.postcode()).with_name(entry.name())
    }

    /// Runs the init step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] if the entry no longer exists.
    pub async fn step_init(
        &self,
        store: &SettingsStore,
        input: UserInput,
    ) -> Result<FlowResult, StoreError> {
        let errors = length_errors(&input.postcode);
        if !errors.is_empty() {
            return Ok(FlowResult::form("init", errors));
        }

        let options = EntryOptions {
            postcode: Some(input.postcode.clone()),
            name: Some(input.name_or_default().to_string()),
        };
        store.set_options(&self.entry_id, options).await?;

        let entry = store
            .entry(&self.entry_id)
            .await
            .ok_or_else(|| StoreError::EntryNotFound(self.entry_id.clone()))?;
        Ok(FlowResult::UpdateEntry { entry })
    }
}

// ============================================================================
// Tests
// ============================================================================
