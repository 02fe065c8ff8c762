//! Path management for scormhost data and configuration.
//!
//! ```text
//! ~/.config/scormhost/
//! └── config.toml              # HostConfig
//!
//! <data_dir>/                  # ~/.local/share/scormhost by default
//! ├── packages/                # extracted packages, one directory each
//! ├── runtime/                 # run-time key/value stores, one file per key
//! ├── tracking/                # tracking log, one file per package
//! └── visits/                  # visit log, one file per package
//! ```

use scormhost_core::config::HostConfig;
use scormhost_core::{Result, ScormHostError};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "scormhost";

/// Resolved directories for one host instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    data_dir: PathBuf,
    packages_dir: PathBuf,
}

impl HostPaths {
    /// Everything under `data_dir`, packages included.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            packages_dir: data_dir.join("packages"),
            data_dir,
        }
    }

    /// Resolves paths from config, falling back to the platform data dir.
    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => Self::default_data_dir()?,
        };
        let mut paths = Self::new(data_dir);
        if let Some(packages) = &config.packages_dir {
            paths.packages_dir = packages.clone();
        }
        Ok(paths)
    }

    pub fn with_packages_dir(mut self, packages_dir: impl Into<PathBuf>) -> Self {
        self.packages_dir = packages_dir.into();
        self
    }

    /// Platform config directory, e.g. `~/.config/scormhost`.
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ScormHostError::config("Cannot determine config directory"))
    }

    pub fn default_config_file() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Platform data directory, e.g. `~/.local/share/scormhost`.
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ScormHostError::config("Cannot determine data directory"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.data_dir.join("runtime")
    }

    pub fn tracking_dir(&self) -> PathBuf {
        self.data_dir.join("tracking")
    }

    pub fn visits_dir(&self) -> PathBuf {
        self.data_dir.join("visits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_data_dir() {
        let paths = HostPaths::new("/var/lib/scormhost");
        assert_eq!(paths.packages_dir(), Path::new("/var/lib/scormhost/packages"));
        assert_eq!(paths.runtime_dir(), PathBuf::from("/var/lib/scormhost/runtime"));
        assert_eq!(paths.tracking_dir(), PathBuf::from("/var/lib/scormhost/tracking"));
        assert_eq!(paths.visits_dir(), PathBuf::from("/var/lib/scormhost/visits"));
    }

    #[test]
    fn test_config_overrides_packages_dir() {
        let config = HostConfig {
            data_dir: Some(PathBuf::from("/data")),
            packages_dir: Some(PathBuf::from("/srv/packages")),
            ..HostConfig::default()
        };
        let paths = HostPaths::from_config(&config).unwrap();
        assert_eq!(paths.data_dir(), Path::new("/data"));
        assert_eq!(paths.packages_dir(), Path::new("/srv/packages"));
    }
}
