//! Coordinator snapshot.
//!
//! The coordinator swaps a new [`OutageSet`] in after every successful
//! refresh. Sensors never see the coordinator itself, only this immutable
//! view of it.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::outage::{OutageRecord, OutageSet};

/// Immutable view of a coordinator's state.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorSnapshot {
    /// Last successfully fetched set. `None` until the first success.
    ///
    /// A failed refresh leaves this untouched.
    pub data: Option<Arc<OutageSet>>,
    /// Whether the most recent refresh succeeded.
    pub last_update_success: bool,
    /// When data was last replaced.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,
}

impl CoordinatorSnapshot {
    /// Snapshot of a coordinator that has never refreshed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot holding `set` after a successful refresh.
    pub fn with_data(set: OutageSet) -> Self {
        Self {
            data: Some(Arc::new(set)),
            last_update_success: true,
            last_updated: Some(Utc::now()),
            last_error: None,
        }
    }

    /// True once any refresh has succeeded, even if nothing matched.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// The current set, if any refresh has succeeded.
    pub fn current(&self) -> Option<&OutageSet> {
        self.data.as_deref()
    }

    /// Records of the last successful fetch; empty before the first one.
    pub fn last_known(&self) -> &[OutageRecord] {
        match self.data.as_deref() {
            Some(set) => set.records(),
            None => &[],
        }
    }

    /// Number of known records.
    pub fn len(&self) -> usize {
        self.last_known().len()
    }

    /// True when there are no known records.
    pub fn is_empty(&self) -> bool {
        self.last_known().is_empty()
    }

    /// Record at `index` in the current set.
    pub fn record(&self, index: usize) -> Option<&OutageRecord> {
        self.last_known().get(index)
    }

    /// Latest event of the last known set.
    pub fn latest_event(&self) -> Option<&OutageRecord> {
        self.current().and_then(OutageSet::latest_event)
    }
}
