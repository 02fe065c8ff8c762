//! Folding raw tracking entries into per-visit snapshots.

use std::collections::{BTreeMap, HashMap};

use crate::tracking::model::{CombinedSnapshot, TrackingEntry, VisitLog, VisitRecord};

/// Combines a package's entries into one snapshot per visit.
///
/// Entries are stably sorted by timestamp, then each visit's `data` maps
/// are folded left to right (last write wins per key). The result is
/// independent of storage order except among entries sharing a timestamp,
/// which keep their stored order. Snapshots come out in order of each
/// visit's first entry.
pub fn combine(entries: &[TrackingEntry], visits: &[VisitRecord]) -> Vec<CombinedSnapshot> {
    let mut sorted: Vec<&TrackingEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut snapshots: Vec<CombinedSnapshot> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in sorted {
        let key = entry.visit_key();
        let slot = *index.entry(key).or_insert_with(|| {
            snapshots.push(CombinedSnapshot {
                visit_id: key.to_string(),
                first_timestamp: entry.timestamp,
                last_timestamp: entry.timestamp,
                version: None,
                data: Default::default(),
                started_at: None,
            });
            snapshots.len() - 1
        });

        let snapshot = &mut snapshots[slot];
        snapshot.first_timestamp = snapshot.first_timestamp.min(entry.timestamp);
        snapshot.last_timestamp = snapshot.last_timestamp.max(entry.timestamp);
        if entry.version.is_some() {
            snapshot.version = entry.version;
        }
        for (k, v) in &entry.data {
            snapshot.data.insert(k.clone(), v.clone());
        }
    }

    for snapshot in snapshots.iter_mut() {
        snapshot.started_at = visits
            .iter()
            .find(|v| v.id == snapshot.visit_id)
            .map(|v| v.started_at);
    }
    snapshots
}

/// [`combine`] for every package in `entries`.
pub fn combine_all(
    entries: &BTreeMap<String, Vec<TrackingEntry>>,
    visits: &BTreeMap<String, VisitLog>,
) -> BTreeMap<String, Vec<CombinedSnapshot>> {
    entries
        .iter()
        .map(|(package_id, package_entries)| {
            let package_visits = visits
                .get(package_id)
                .map(|log| log.visits.as_slice())
                .unwrap_or(&[]);
            (package_id.clone(), combine(package_entries, package_visits))
        })
        .collect()
}
