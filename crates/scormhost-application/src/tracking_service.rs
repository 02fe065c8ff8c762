//! Tracking use cases.
//!
//! `TrackingService` records commit snapshots and visits and builds the
//! per-visit combined views over them.

use std::collections::BTreeMap;
use std::sync::Arc;

use scormhost_core::Result;
use scormhost_core::package::validate_package_id;
use scormhost_core::runtime::{DataMap, ScormVersion};
use scormhost_core::tracking::{
    CombinedSnapshot, TrackingEntry, TrackingRepository, VisitLog, VisitReceipt, VisitSummary,
    combine, combine_all, now_millis, summarize, summarize_all,
};

pub struct TrackingService {
    repository: Arc<dyn TrackingRepository>,
}

impl TrackingService {
    pub fn new(repository: Arc<dyn TrackingRepository>) -> Self {
        Self { repository }
    }

    /// Appends a snapshot to the package's tracking log, stamped now.
    pub async fn track(
        &self,
        package_id: &str,
        version: Option<ScormVersion>,
        data: DataMap,
        visit_id: Option<String>,
    ) -> Result<TrackingEntry> {
        validate_package_id(package_id)?;
        let entry = TrackingEntry {
            package_id: package_id.to_string(),
            timestamp: now_millis(),
            visit_id: visit_id.filter(|v| !v.is_empty()),
            version,
            data,
        };
        tracing::debug!(
            "[TrackingService] Tracking {} keys for '{}' (visit {})",
            entry.data.len(),
            package_id,
            entry.visit_key()
        );
        self.repository.append_entry(entry).await
    }

    pub async fn entries(&self, package_id: &str) -> Result<Vec<TrackingEntry>> {
        self.repository.entries_for(package_id).await
    }

    pub async fn all_entries(&self) -> Result<BTreeMap<String, Vec<TrackingEntry>>> {
        self.repository.all_entries().await
    }

    pub async fn record_visit(&self, package_id: &str) -> Result<VisitReceipt> {
        self.repository.record_visit(package_id).await
    }

    pub async fn visits(&self, package_id: &str) -> Result<VisitLog> {
        self.repository.visits_for(package_id).await
    }

    pub async fn all_visits(&self) -> Result<BTreeMap<String, VisitLog>> {
        self.repository.all_visits().await
    }

    /// One combined snapshot per visit of `package_id`.
    pub async fn combined(&self, package_id: &str) -> Result<Vec<CombinedSnapshot>> {
        let entries = self.repository.entries_for(package_id).await?;
        let visits = self.repository.visits_for(package_id).await?;
        Ok(combine(&entries, &visits.visits))
    }

    /// [`combined`](Self::combined) for every package with entries.
    pub async fn combined_all(&self) -> Result<BTreeMap<String, Vec<CombinedSnapshot>>> {
        let entries = self.repository.all_entries().await?;
        let visits = self.repository.all_visits().await?;
        Ok(combine_all(&entries, &visits))
    }

    /// Combined snapshots of `package_id` with visit numbers and session
    /// seconds.
    pub async fn summaries(&self, package_id: &str) -> Result<Vec<VisitSummary>> {
        let entries = self.repository.entries_for(package_id).await?;
        let visits = self.repository.visits_for(package_id).await?;
        Ok(summarize(combine(&entries, &visits.visits), &visits.visits))
    }

    pub async fn summaries_all(&self) -> Result<BTreeMap<String, Vec<VisitSummary>>> {
        let entries = self.repository.all_entries().await?;
        let visits = self.repository.all_visits().await?;
        Ok(summarize_all(combine_all(&entries, &visits), &visits))
    }
}
