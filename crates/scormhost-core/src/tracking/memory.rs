//! In-memory tracking repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::tracking::model::{
    TrackingEntry, VisitLog, VisitReceipt, VisitRecord, new_visit_id, now_millis,
};
use crate::tracking::repository::TrackingRepository;

#[derive(Debug, Default)]
struct Logs {
    entries: BTreeMap<String, Vec<TrackingEntry>>,
    visits: BTreeMap<String, VisitLog>,
}

/// Tracking store held in process memory. A single lock serializes all
/// writers, which trivially satisfies per-package serialization.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackingRepository {
    logs: Arc<Mutex<Logs>>,
}

impl InMemoryTrackingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingRepository for InMemoryTrackingRepository {
    async fn append_entry(&self, entry: TrackingEntry) -> Result<TrackingEntry> {
        let mut logs = self.logs.lock().await;
        logs.entries
            .entry(entry.package_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn entries_for(&self, package_id: &str) -> Result<Vec<TrackingEntry>> {
        let logs = self.logs.lock().await;
        Ok(logs.entries.get(package_id).cloned().unwrap_or_default())
    }

    async fn all_entries(&self) -> Result<BTreeMap<String, Vec<TrackingEntry>>> {
        Ok(self.logs.lock().await.entries.clone())
    }

    async fn record_visit(&self, package_id: &str) -> Result<VisitReceipt> {
        let started_at = now_millis();
        let visit_id = new_visit_id(started_at);
        let mut logs = self.logs.lock().await;
        let log = logs.visits.entry(package_id.to_string()).or_default();
        log.record(VisitRecord {
            id: visit_id.clone(),
            started_at,
        });
        Ok(VisitReceipt {
            package_id: package_id.to_string(),
            count: log.count,
            visit_id,
        })
    }

    async fn visits_for(&self, package_id: &str) -> Result<VisitLog> {
        let logs = self.logs.lock().await;
        Ok(logs.visits.get(package_id).cloned().unwrap_or_default())
    }

    async fn all_visits(&self) -> Result<BTreeMap<String, VisitLog>> {
        Ok(self.logs.lock().await.visits.clone())
    }
}
