use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::manifest::DEFAULT_FALLBACK_CANDIDATES;
use crate::package::DEFAULT_MANIFEST_SEARCH_DEPTH;

/// Host configuration, read from `config.toml`.
///
/// Every field has a default, so an empty or partial file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Root for tracking logs and run-time data. Platform data dir if unset.
    pub data_dir: Option<PathBuf>,
    /// Directory holding extracted packages. `<data_dir>/packages` if unset.
    pub packages_dir: Option<PathBuf>,
    /// URL the packages directory is served under, without `/packages`.
    pub public_base_url: String,
    pub commit_delay_ms: u64,
    pub manifest_search_depth: usize,
    pub fallback_launch_candidates: Vec<String>,
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            packages_dir: None,
            public_base_url: "http://localhost:4300/".to_string(),
            commit_delay_ms: 800,
            manifest_search_depth: DEFAULT_MANIFEST_SEARCH_DEPTH,
            fallback_launch_candidates: DEFAULT_FALLBACK_CANDIDATES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

impl HostConfig {
    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }
}
