//! File-backed TrackingRepository implementation.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scormhost_core::package::validate_package_id;
use scormhost_core::tracking::{
    TrackingEntry, TrackingRepository, VisitLog, VisitReceipt, VisitRecord, new_visit_id,
    now_millis,
};
use scormhost_core::{Result, ScormHostError};
use serde::{Serialize, de::DeserializeOwned};

use crate::dto::{TrackingFileDTO, VisitsFileDTO};
use crate::storage::AtomicJsonFile;

/// Per-package JSON logs.
///
/// Directory structure:
/// ```text
/// tracking/
/// ├── <package-id>.json    # [TrackingEntry, ...]
/// visits/
/// └── <package-id>.json    # {count, visits: [...]} or a bare count
/// ```
///
/// Each read-modify-write holds the package's in-process mutex and an
/// exclusive file lock, so concurrent appends never drop an update. A
/// package's mutex is dropped from the map once no writer holds it.
#[derive(Debug, Clone)]
pub struct FileTrackingRepository {
    tracking_dir: PathBuf,
    visits_dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl FileTrackingRepository {
    pub fn new(tracking_dir: impl Into<PathBuf>, visits_dir: impl Into<PathBuf>) -> Self {
        Self {
            tracking_dir: tracking_dir.into(),
            visits_dir: visits_dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn package_lock(&self, package_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(package_id.to_string()).or_default().clone()
    }

    fn release_lock(&self, package_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        drop(lock);
        // Clones are only handed out under the map lock, so a count of one
        // means no writer is waiting on this package.
        if locks
            .get(package_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(package_id);
        }
    }

    /// Runs `work` while holding the package's mutex.
    async fn with_package_lock<T>(
        &self,
        package_id: &str,
        work: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        let lock = self.package_lock(package_id);
        let result = {
            let _guard = lock.lock().await;
            work.await
        };
        self.release_lock(package_id, lock);
        result
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn tracking_file(&self, package_id: &str) -> PathBuf {
        self.tracking_dir.join(format!("{}.json", package_id))
    }

    fn visits_file(&self, package_id: &str) -> PathBuf {
        self.visits_dir.join(format!("{}.json", package_id))
    }
}

/// Runs blocking file work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScormHostError::internal(format!("File task failed: {}", e)))?
}

fn load_file<T>(path: PathBuf) -> Result<Option<T>>
where
    T: Serialize + DeserializeOwned,
{
    Ok(AtomicJsonFile::<T>::new(path).load()?)
}

/// Loads every `<id>.json` in `dir`, keyed by id. A missing dir is empty.
fn load_dir<T>(dir: &Path) -> Result<BTreeMap<String, T>>
where
    T: Serialize + DeserializeOwned,
{
    let mut out = BTreeMap::new();
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };

    for entry in read_dir {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if validate_package_id(id).is_err() || id.starts_with('.') {
            continue;
        }
        let id = id.to_string();
        match AtomicJsonFile::<T>::new(path.clone()).load() {
            Ok(Some(value)) => {
                out.insert(id, value);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("[FileTrackingRepository] Skipping {:?}: {}", path, e);
            }
        }
    }
    Ok(out)
}

#[async_trait]
impl TrackingRepository for FileTrackingRepository {
    async fn append_entry(&self, entry: TrackingEntry) -> Result<TrackingEntry> {
        validate_package_id(&entry.package_id)?;
        let path = self.tracking_file(&entry.package_id);
        let stored = entry.clone();
        let total = self
            .with_package_lock(
                &entry.package_id,
                blocking(move || -> Result<usize> {
                    let file = AtomicJsonFile::<TrackingFileDTO>::new(path);
                    Ok(file.update(Vec::new(), |entries| {
                        entries.push(stored);
                        entries.len()
                    })?)
                }),
            )
            .await?;

        tracing::debug!(
            "[FileTrackingRepository] Appended entry {} for '{}'",
            total,
            entry.package_id
        );
        Ok(entry)
    }

    async fn entries_for(&self, package_id: &str) -> Result<Vec<TrackingEntry>> {
        validate_package_id(package_id)?;
        let path = self.tracking_file(package_id);
        Ok(blocking(move || load_file::<TrackingFileDTO>(path))
            .await?
            .unwrap_or_default())
    }

    async fn all_entries(&self) -> Result<BTreeMap<String, Vec<TrackingEntry>>> {
        let dir = self.tracking_dir.clone();
        blocking(move || load_dir::<TrackingFileDTO>(&dir)).await
    }

    async fn record_visit(&self, package_id: &str) -> Result<VisitReceipt> {
        validate_package_id(package_id)?;
        let path = self.visits_file(package_id);
        let (visit_id, count) = self
            .with_package_lock(package_id, async move {
                let started_at = now_millis();
                let visit_id = new_visit_id(started_at);
                let record = VisitRecord {
                    id: visit_id.clone(),
                    started_at,
                };
                let count = blocking(move || -> Result<u64> {
                    let file = AtomicJsonFile::<VisitsFileDTO>::new(path);
                    Ok(file.update(VisitsFileDTO::default(), |dto| {
                        let mut log = VisitLog::from(std::mem::take(dto));
                        log.record(record);
                        let count = log.count;
                        *dto = VisitsFileDTO::from(log);
                        count
                    })?)
                })
                .await?;
                Ok::<_, ScormHostError>((visit_id, count))
            })
            .await?;

        tracing::info!(
            "[FileTrackingRepository] Visit {} #{} for '{}'",
            visit_id,
            count,
            package_id
        );
        Ok(VisitReceipt {
            package_id: package_id.to_string(),
            count,
            visit_id,
        })
    }

    async fn visits_for(&self, package_id: &str) -> Result<VisitLog> {
        validate_package_id(package_id)?;
        let path = self.visits_file(package_id);
        Ok(blocking(move || load_file::<VisitsFileDTO>(path))
            .await?
            .map(VisitLog::from)
            .unwrap_or_default())
    }

    async fn all_visits(&self) -> Result<BTreeMap<String, VisitLog>> {
        let dir = self.visits_dir.clone();
        let files = blocking(move || load_dir::<VisitsFileDTO>(&dir)).await?;
        Ok(files
            .into_iter()
            .map(|(id, dto)| (id, VisitLog::from(dto)))
            .collect())
    }
}
