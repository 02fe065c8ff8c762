//! Hosted packages and where their manifests live.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScormHostError};

/// File name searched for when locating a package manifest.
pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

/// Default depth limit for the manifest search.
pub const DEFAULT_MANIFEST_SEARCH_DEPTH: usize = 6;

/// Where the manifest sits inside a package, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestLocation {
    /// Directory holding the manifest, empty for the package root.
    pub base_rel_dir: String,
    pub manifest_rel_path: String,
}

/// An extracted package. Derived from the filesystem on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub root: PathBuf,
    pub location: Option<ManifestLocation>,
}

impl Package {
    /// Public path of the directory content is served from.
    pub fn public_path(&self) -> String {
        match self.location.as_ref().map(|l| l.base_rel_dir.as_str()) {
            Some(base) if !base.is_empty() => format!("/packages/{}/{}", self.id, base),
            _ => format!("/packages/{}", self.id),
        }
    }

    /// Public path of the manifest, if one was found.
    pub fn public_manifest(&self) -> Option<String> {
        self.location
            .as_ref()
            .map(|l| format!("/packages/{}/{}", self.id, l.manifest_rel_path))
    }

    /// Manifest path on disk.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.location
            .as_ref()
            .map(|l| self.root.join(&l.manifest_rel_path))
    }
}

/// Rejects ids that could escape the packages directory.
pub fn validate_package_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if ok {
        Ok(())
    } else {
        Err(ScormHostError::invalid_input(format!(
            "invalid package id '{}'",
            id
        )))
    }
}

/// Read side of package listing.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Package>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Package>>;
}
