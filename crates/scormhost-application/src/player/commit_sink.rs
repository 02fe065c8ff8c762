use std::sync::{Arc, Mutex, MutexGuard};

use scormhost_core::runtime::{CommitSink, DataMap, ScormVersion};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::tracking_service::TrackingService;

/// Most recent snapshot the sink received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSnapshot {
    pub version: ScormVersion,
    pub data: DataMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
}

#[derive(Default)]
struct SinkState {
    visit_id: Option<String>,
    last: Option<LastSnapshot>,
    /// Most recent tracking write; each write awaits its predecessor.
    tail: Option<JoinHandle<()>>,
}

/// Commit sink that appends every snapshot to the package's tracking log.
///
/// `notify` runs inside the session lock, so the append is spawned on the
/// ambient runtime. Appends are chained so they land in notification order;
/// [`drain`](Self::drain) awaits the chain.
pub struct TrackingCommitSink {
    package_id: String,
    tracking: Arc<TrackingService>,
    state: Mutex<SinkState>,
}

impl TrackingCommitSink {
    pub fn new(package_id: impl Into<String>, tracking: Arc<TrackingService>) -> Self {
        Self {
            package_id: package_id.into(),
            tracking,
            state: Mutex::new(SinkState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tags subsequent entries with `visit_id`.
    pub fn set_visit_id(&self, visit_id: Option<String>) {
        self.state().visit_id = visit_id;
    }

    pub fn visit_id(&self) -> Option<String> {
        self.state().visit_id.clone()
    }

    pub fn last_snapshot(&self) -> Option<LastSnapshot> {
        self.state().last.clone()
    }

    /// Waits for every tracking write spawned so far.
    pub async fn drain(&self) {
        let tail = self.state().tail.take();
        if let Some(handle) = tail
            && let Err(e) = handle.await
        {
            tracing::warn!("[TrackingCommitSink] Tracking task failed: {}", e);
        }
    }
}

impl CommitSink for TrackingCommitSink {
    fn notify(&self, version: ScormVersion, snapshot: DataMap) {
        let mut state = self.state();
        let visit_id = state.visit_id.clone();
        state.last = Some(LastSnapshot {
            version,
            data: snapshot.clone(),
            visit_id: visit_id.clone(),
        });

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(
                "[TrackingCommitSink] No async runtime; snapshot for '{}' not tracked",
                self.package_id
            );
            return;
        };

        let tracking = self.tracking.clone();
        let package_id = self.package_id.clone();
        let previous = state.tail.take();
        state.tail = Some(handle.spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if let Err(e) = tracking
                .track(&package_id, Some(version), snapshot, visit_id)
                .await
            {
                tracing::warn!(
                    "[TrackingCommitSink] Failed to track '{}': {}",
                    package_id,
                    e
                );
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scormhost_core::tracking::InMemoryTrackingRepository;

    #[tokio::test]
    async fn test_snapshots_are_tracked_with_visit_id() {
        let tracking = Arc::new(TrackingService::new(Arc::new(
            InMemoryTrackingRepository::new(),
        )));
        let sink = TrackingCommitSink::new("course", tracking.clone());

        let mut data = DataMap::new();
        data.insert("cmi.location".into(), "4".into());
        sink.notify(ScormVersion::Scorm2004, data.clone());
        sink.set_visit_id(Some("v-1".into()));
        sink.notify(ScormVersion::Scorm2004, data.clone());
        sink.drain().await;

        let entries = tracking.entries("course").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].visit_id, None);
        assert_eq!(entries[1].visit_id.as_deref(), Some("v-1"));

        let last = sink.last_snapshot().unwrap();
        assert_eq!(last.data, data);
        assert_eq!(last.visit_id.as_deref(), Some("v-1"));
    }

    #[test]
    fn test_without_runtime_only_last_snapshot_is_kept() {
        let tracking = Arc::new(TrackingService::new(Arc::new(
            InMemoryTrackingRepository::new(),
        )));
        let sink = TrackingCommitSink::new("course", tracking);
        sink.notify(ScormVersion::Scorm12, DataMap::new());
        assert_eq!(sink.last_snapshot().unwrap().version, ScormVersion::Scorm12);
    }
}
