//! Persistence seam for run-time session data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ScormHostError};
use crate::runtime::model::DataMap;

/// Keyed store a [`RuntimeSession`](super::RuntimeSession) persists into.
///
/// Each session owns exactly one key; implementations never need to
/// coordinate two writers on the same key. Calls are synchronous because
/// the content-facing API is.
pub trait DataStore: Send + Sync {
    /// Loads the map stored under `key`, or an empty map if nothing is stored.
    fn load(&self, key: &str) -> Result<DataMap>;

    /// Replaces the map stored under `key`.
    fn save(&self, key: &str, data: &DataMap) -> Result<()>;
}

/// In-process store, the equivalent of browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataStore {
    entries: Arc<Mutex<HashMap<String, DataMap>>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        }
    }
}

impl DataStore for MemoryDataStore {
    fn load(&self, key: &str) -> Result<DataMap> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ScormHostError::data_access(format!("store lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &str, data: &DataMap) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ScormHostError::data_access(format!("store lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_empty() {
        let store = MemoryDataStore::new();
        assert!(store.load("nothing").unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_map() {
        let store = MemoryDataStore::new();
        let mut first = DataMap::new();
        first.insert("a".into(), "1".into());
        first.insert("b".into(), "2".into());
        store.save("k", &first).unwrap();

        let mut second = DataMap::new();
        second.insert("a".into(), "3".into());
        store.save("k", &second).unwrap();

        assert_eq!(store.load("k").unwrap(), second);
        assert_eq!(store.keys(), vec!["k".to_string()]);
    }
}
