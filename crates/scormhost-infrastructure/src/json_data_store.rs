//! File-backed run-time key/value store.

use std::path::{Path, PathBuf};

use scormhost_core::Result;
use scormhost_core::runtime::{DataMap, DataStore};

use crate::storage::AtomicJsonFile;

/// One JSON object per storage key under a directory.
///
/// ```text
/// runtime/
/// ├── scorm%3Acourse-1%3A2004.json
/// └── scorm%3Acourse-1%3A12.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonDataStore {
    dir: PathBuf,
}

impl JsonDataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, key: &str) -> AtomicJsonFile<DataMap> {
        AtomicJsonFile::new(self.dir.join(format!("{}.json", encode_key(key))))
    }
}

/// Percent-encodes anything outside `[A-Za-z0-9._-]` so distinct keys never
/// share a file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

impl DataStore for JsonDataStore {
    fn load(&self, key: &str) -> Result<DataMap> {
        Ok(self.file(key).load()?.unwrap_or_default())
    }

    fn save(&self, key: &str, data: &DataMap) -> Result<()> {
        self.file(key).save(data)?;
        tracing::trace!("[JsonDataStore] Saved {} keys under '{}'", data.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_keys_map_to_distinct_files() {
        assert_eq!(encode_key("scorm:course-1:2004"), "scorm%3Acourse-1%3A2004");
        assert_ne!(encode_key("a:b"), encode_key("a_b"));
        assert_eq!(encode_key("../x"), "..%2Fx");
    }

    #[test]
    fn test_round_trip_and_isolation() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDataStore::new(temp_dir.path());

        assert!(store.load("scorm:p:2004").unwrap().is_empty());

        let mut data = DataMap::new();
        data.insert("cmi.location".into(), "7".into());
        store.save("scorm:p:2004", &data).unwrap();

        assert_eq!(store.load("scorm:p:2004").unwrap(), data);
        assert!(store.load("scorm:p:12").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_surfaces_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDataStore::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("k.json"), "[1,").unwrap();
        assert!(store.load("k").is_err());
    }
}
