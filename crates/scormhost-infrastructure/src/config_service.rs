//! Configuration service implementation.
//!
//! Loads [`HostConfig`] from `config.toml`, by default
//! `<platform config dir>/scormhost/config.toml`.

use crate::paths::HostPaths;
use scormhost_core::config::HostConfig;
use scormhost_core::{Result, ScormHostError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Loads and caches the host configuration.
///
/// A missing file yields defaults. A malformed one is a `Config` error and
/// is not cached, so fixing the file and calling again picks it up.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<HostConfig>>>,
}

impl ConfigService {
    /// Reads from the platform config location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => HostPaths::default_config_file(),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<HostConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_config(&self.config_path()?)?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(path: &Path) -> Result<HostConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
                return Ok(HostConfig::default());
            }
            Err(e) => {
                return Err(ScormHostError::config(format!(
                    "Failed to read {:?}: {}",
                    path, e
                )));
            }
        };

        let config: HostConfig = toml::from_str(&content).map_err(|e| {
            ScormHostError::config(format!("Failed to parse {:?}: {}", path, e))
        })?;
        tracing::debug!("[ConfigService] Loaded config from {:?}", path);
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
