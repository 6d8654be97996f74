//! Update coordinator.
//!
//! Owns the last known power cut set for one config entry and refreshes it
//! from an [`OutageSource`]. Sensors read immutable snapshots; a refresh
//! swaps in a new set under a short write lock, so no reader ever sees a
//! partial update.

use chrono::Utc;
use powercuts_core::consts::SCAN_INTERVAL;
use powercuts_core::{CoordinatorSnapshot, OutageSet, PostcodeQuery};
use powercuts_fetch::{FetchError, OutageSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::error::StoreError;
use crate::settings_store::ConfigEntry;

// ============================================================================
// Inner State
// ============================================================================

/// Internal state for the coordinator.
#[derive(Default)]
struct CoordinatorInner {
    /// What sensors see.
    snapshot: CoordinatorSnapshot,
}

/// Marks a refresh as running until dropped.
///
/// Dropping the `refresh` future mid-fetch (timeout, `select!`, abort)
/// still releases the flag.
struct RefreshGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

// ============================================================================
// Update Coordinator
// ============================================================================

/// Refreshes one config entry's power cuts.
///
/// Observable via a watch channel bumped on every state change.
pub struct UpdateCoordinator<S> {
    entry_id: String,
    query: PostcodeQuery,
    source: Arc<S>,
    update_interval: Duration,
    inner: Arc<RwLock<CoordinatorInner>>,
    refreshing: Arc<AtomicBool>,
    notify: Arc<watch::Sender<u64>>,
    version: Arc<RwLock<u64>>,
}

impl<S> Clone for UpdateCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            entry_id: self.entry_id.clone(),
            query: self.query.clone(),
            source: Arc::clone(&self.source),
            update_interval: self.update_interval,
            inner: Arc::clone(&self.inner),
            refreshing: Arc::clone(&self.refreshing),
            notify: Arc::clone(&self.notify),
            version: Arc::clone(&self.version),
        }
    }
}

impl<S: OutageSource> UpdateCoordinator<S> {
    /// Creates a coordinator that has not refreshed yet.
    pub fn new(entry_id: impl Into<String>, query: PostcodeQuery, source: S) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            entry_id: entry_id.into(),
            query,
            source: Arc::new(source),
            update_interval: SCAN_INTERVAL,
            inner: Arc::new(RwLock::new(CoordinatorInner::default())),
            refreshing: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(notify),
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Creates a coordinator for `entry`, honouring its options.
    pub fn for_entry(entry: &ConfigEntry, source: S) -> Self {
        Self::new(&entry.entry_id, entry.query(), source)
    }

    /// Sets the refresh interval.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Config entry this coordinator serves.
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    /// Postcode being matched.
    pub fn query(&self) -> &PostcodeQuery {
        &self.query
    }

    /// How often the host should call [`refresh`](Self::refresh).
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> CoordinatorSnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Whether a refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Fetches fresh data.
    ///
    /// On success the new set replaces the old one. On failure the old set
    /// is kept, the snapshot is marked unsuccessful and
    /// [`StoreError::UpdateFailed`] is returned.
    ///
    /// # Errors
    ///
    /// [`StoreError::RefreshInProgress`] if another refresh is running,
    /// [`StoreError::UpdateFailed`] if the fetch failed.
    #[instrument(skip(self), fields(entry_id = %self.entry_id, source = self.source.name()))]
    pub async fn refresh(&self) -> Result<CoordinatorSnapshot, StoreError> {
        let _guard = self.start_refresh()?;
        debug!(postcode = %self.query, "Refreshing");

        let result = self.source.fetch_outages(&self.query).await;
        self.end_refresh(result).await
    }

    fn start_refresh(&self) -> Result<RefreshGuard, StoreError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StoreError::RefreshInProgress(self.entry_id.clone()));
        }
        Ok(RefreshGuard {
            running: Arc::clone(&self.refreshing),
        })
    }

    async fn end_refresh(
        &self,
        result: Result<OutageSet, FetchError>,
    ) -> Result<CoordinatorSnapshot, StoreError> {
        let outcome = {
            let mut inner = self.inner.write().await;

            match result {
                Ok(set) => {
                    info!(count = set.len(), "Power cuts updated");
                    inner.snapshot = CoordinatorSnapshot {
                        data: Some(Arc::new(set)),
                        last_update_success: true,
                        last_updated: Some(Utc::now()),
                        last_error: None,
                    };
                    Ok(inner.snapshot.clone())
                }
                Err(e) => {
                    let message = failure_message(&e);
                    inner.snapshot.last_update_success = false;
                    inner.snapshot.last_error = Some(message.clone());
                    Err(StoreError::UpdateFailed(message))
                }
            }
        };

        self.notify_change().await;
        outcome
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

/// Message recorded for a failed refresh, logged at a level matching its
/// cause.
fn failure_message(err: &FetchError) -> String {
    if err.is_communication() {
        warn!(error = %err, "Error communicating with API");
        format!("Error communicating with API: {err}")
    } else {
        error!(error = %err, "Unexpected error fetching data");
        format!("Unexpected error: {err}")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use powercuts_core::{OutageRecord, OutageSet};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued results, one per fetch.
    struct ScriptedSource {
        results: Mutex<VecDeque<Result<OutageSet, FetchError>>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<OutageSet, FetchError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl OutageSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_outages(&self, _query: &PostcodeQuery) -> Result<OutageSet, FetchError> {
            tokio::time::sleep(self.delay).await;
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(OutageSet::empty()))
        }
    }

    fn set(references: &[&str]) -> OutageSet {
        OutageSet::new(
            references
                .iter()
                .map(|r| OutageRecord {
                    reference: Some((*r).to_string()),
                    postcode: Some("NE1 1AA".to_string()),
                    ..OutageRecord::default()
                })
                .collect(),
        )
    }

    fn decode_error() -> FetchError {
        FetchError::Json(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    fn coordinator(results: Vec<Result<OutageSet, FetchError>>) -> UpdateCoordinator<ScriptedSource> {
        UpdateCoordinator::new("ne11aa", PostcodeQuery::new("NE1 1AA"), ScriptedSource::new(results))
    }

    #[tokio::test]
    async fn test_successful_refresh_swaps_data() {
        let coordinator = coordinator(vec![Ok(set(&["A", "B"]))]);
        assert!(!coordinator.snapshot().await.has_data());

        let snapshot = coordinator.refresh().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.last_update_success);
        assert!(snapshot.last_updated.is_some());
        assert_eq!(coordinator.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_previous_data() {
        let coordinator = coordinator(vec![Ok(set(&["A"])), Err(decode_error())]);
        coordinator.refresh().await.unwrap();

        let err = coordinator.refresh().await.unwrap_err();
        assert!(
            err.to_string().starts_with("Error communicating with API:"),
            "{err}"
        );

        let snapshot = coordinator.snapshot().await;
        assert!(!snapshot.last_update_success);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.record(0).unwrap().reference.as_deref(), Some("A"));
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_unexpected_failure_message() {
        let coordinator = coordinator(vec![Err(FetchError::InvalidUrl("nope".into()))]);
        let err = coordinator.refresh().await.unwrap_err();
        assert!(err.to_string().starts_with("Unexpected error:"), "{err}");
        assert!(!coordinator.snapshot().await.has_data());
    }

    #[tokio::test]
    async fn test_recovery_clears_error() {
        let coordinator = coordinator(vec![Err(FetchError::Timeout(10)), Ok(set(&[]))]);
        assert!(coordinator.refresh().await.is_err());

        let snapshot = coordinator.refresh().await.unwrap();
        assert!(snapshot.last_update_success);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.has_data());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_rejected() {
        let source = ScriptedSource {
            results: Mutex::new(VecDeque::new()),
            delay: Duration::from_millis(200),
        };
        let coordinator = UpdateCoordinator::new("ne11aa", PostcodeQuery::new("NE1"), source);

        let running = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(coordinator.is_refreshing());
        assert!(matches!(
            coordinator.refresh().await,
            Err(StoreError::RefreshInProgress(_))
        ));

        running.await.unwrap().unwrap();
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_cancelled_refresh_releases_guard() {
        let source = ScriptedSource {
            results: Mutex::new(vec![Ok(set(&["A"])), Ok(set(&["B", "C"]))].into()),
            delay: Duration::from_millis(200),
        };
        let coordinator = UpdateCoordinator::new("ne11aa", PostcodeQuery::new("NE1"), source);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), coordinator.refresh()).await;
        assert!(cancelled.is_err());
        assert!(!coordinator.is_refreshing());

        let snapshot = coordinator.refresh().await.unwrap();
        assert!(snapshot.last_update_success);
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_notified() {
        let coordinator = coordinator(vec![Ok(set(&["A"]))]);
        let mut rx = coordinator.subscribe();

        coordinator.refresh().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn test_default_interval() {
        let coordinator = coordinator(vec![]);
        assert_eq!(coordinator.update_interval(), Duration::from_secs(900));
        let coordinator = coordinator.with_update_interval(Duration::from_secs(60));
        assert_eq!(coordinator.update_interval(), Duration::from_secs(60));
    }
}
