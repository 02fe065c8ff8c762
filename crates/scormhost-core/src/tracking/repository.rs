//! Tracking/visit log store trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::tracking::model::{TrackingEntry, VisitLog, VisitReceipt};

/// Append-only tracking log and visit counter, keyed by package id.
///
/// Implementations serialize read-modify-write per package: concurrent
/// appends and visits for one package must never lose an update.
#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Appends an entry and returns it as stored.
    async fn append_entry(&self, entry: TrackingEntry) -> Result<TrackingEntry>;

    /// Entries for one package, in stored order. Unknown packages yield an
    /// empty list.
    async fn entries_for(&self, package_id: &str) -> Result<Vec<TrackingEntry>>;

    async fn all_entries(&self) -> Result<BTreeMap<String, Vec<TrackingEntry>>>;

    /// Increments the visit counter and records a new visit.
    async fn record_visit(&self, package_id: &str) -> Result<VisitReceipt>;

    async fn visits_for(&self, package_id: &str) -> Result<VisitLog>;

    async fn all_visits(&self) -> Result<BTreeMap<String, VisitLog>>;
}
