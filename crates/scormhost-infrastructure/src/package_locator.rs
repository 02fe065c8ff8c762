//! Package discovery over the extracted packages directory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scormhost_core::package::{
    DEFAULT_MANIFEST_SEARCH_DEPTH, MANIFEST_FILE_NAME, ManifestLocation, Package,
    PackageRepository, validate_package_id,
};
use scormhost_core::{Result, ScormHostError};

/// Breadth-first search for the package manifest under `root`.
///
/// Directories down to `max_depth` levels below `root` are scanned. Files of
/// a directory are checked before any subdirectory is queued, entries are
/// visited in name order, and unreadable directories are skipped. Symlinks
/// are not followed.
pub fn find_manifest(root: &Path, max_depth: usize) -> Option<ManifestLocation> {
    let mut queue: VecDeque<(PathBuf, Vec<String>, usize)> = VecDeque::new();
    queue.push_back((root.to_path_buf(), Vec::new(), 0));

    while let Some((dir, rel, depth)) = queue.pop_front() {
        let mut entries = match std::fs::read_dir(&dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .filter_map(|e| {
                    let file_type = e.file_type().ok()?;
                    let name = e.file_name().into_string().ok()?;
                    Some((name, file_type))
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::debug!("[PackageLocator] Skipping unreadable {:?}: {}", dir, e);
                continue;
            }
        };
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some((name, _)) = entries
            .iter()
            .find(|(name, ft)| ft.is_file() && name.eq_ignore_ascii_case(MANIFEST_FILE_NAME))
        {
            let base_rel_dir = rel.join("/");
            let manifest_rel_path = if base_rel_dir.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", base_rel_dir, name)
            };
            return Some(ManifestLocation {
                base_rel_dir,
                manifest_rel_path,
            });
        }

        if depth >= max_depth {
            continue;
        }
        for (name, _) in entries.into_iter().filter(|(_, ft)| ft.is_dir()) {
            let child = dir.join(&name);
            let mut child_rel = rel.clone();
            child_rel.push(name);
            queue.push_back((child, child_rel, depth + 1));
        }
    }
    None
}

/// PackageRepository over a directory of extracted packages.
///
/// ```text
/// packages/
/// ├── 1700000000000-course_a/
/// │   └── imsmanifest.xml
/// └── 1700000000001-course_b/
///     └── content/imsmanifest.xml
/// ```
///
/// Nothing is cached; every call rescans the filesystem.
#[derive(Debug, Clone)]
pub struct FsPackageRepository {
    packages_dir: PathBuf,
    max_depth: usize,
}

impl FsPackageRepository {
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            max_depth: DEFAULT_MANIFEST_SEARCH_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    fn load(root: PathBuf, id: String, max_depth: usize) -> Package {
        let location = find_manifest(&root, max_depth);
        if location.is_none() {
            tracing::warn!("[PackageLocator] No {} in package '{}'", MANIFEST_FILE_NAME, id);
        }
        Package { id, root, location }
    }
}

#[async_trait]
impl PackageRepository for FsPackageRepository {
    async fn list_all(&self) -> Result<Vec<Package>> {
        let dir = self.packages_dir.clone();
        let max_depth = self.max_depth;
        tokio::task::spawn_blocking(move || -> Result<Vec<Package>> {
            let read_dir = match std::fs::read_dir(&dir) {
                Ok(rd) => rd,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(ScormHostError::from(e)),
            };
            let mut ids = Vec::new();
            for entry in read_dir {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                if let Ok(id) = entry.file_name().into_string() {
                    ids.push(id);
                }
            }
            ids.sort();
            Ok(ids
                .into_iter()
                .map(|id| Self::load(dir.join(&id), id, max_depth))
                .collect())
        })
        .await
        .map_err(|e| ScormHostError::internal(format!("Package scan failed: {}", e)))?
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Package>> {
        validate_package_id(id)?;
        let root = self.packages_dir.join(id);
        let id = id.to_string();
        let max_depth = self.max_depth;
        tokio::task::spawn_blocking(move || {
            if !root.is_dir() {
                return None;
            }
            Some(Self::load(root, id, max_depth))
        })
        .await
        .map_err(|e| ScormHostError::internal(format!("Package scan failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<manifest/>").unwrap();
    }

    #[test]
    fn test_manifest_at_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "imsmanifest.xml");
        touch(dir.path(), "sub/imsmanifest.xml");

        let found = find_manifest(dir.path(), 6).unwrap();
        assert_eq!(found.base_rel_dir, "");
        assert_eq!(found.manifest_rel_path, "imsmanifest.xml");
    }

    #[test]
    fn test_shallowest_match_wins_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/deep/er/imsmanifest.xml");
        touch(dir.path(), "b/course/IMSManifest.XML");

        let found = find_manifest(dir.path(), 6).unwrap();
        assert_eq!(found.base_rel_dir, "b/course");
        assert_eq!(found.manifest_rel_path, "b/course/IMSManifest.XML");
    }

    #[test]
    fn test_siblings_are_visited_in_name_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "zeta/imsmanifest.xml");
        touch(dir.path(), "alpha/imsmanifest.xml");

        assert_eq!(find_manifest(dir.path(), 6).unwrap().base_rel_dir, "alpha");
    }

    #[test]
    fn test_depth_limit() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "1/2/3/imsmanifest.xml");

        assert!(find_manifest(dir.path(), 2).is_none());
        assert_eq!(
            find_manifest(dir.path(), 3).unwrap().manifest_rel_path,
            "1/2/3/imsmanifest.xml"
        );
    }

    #[tokio::test]
    async fn test_repository_lists_directories_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b-course/content/imsmanifest.xml");
        fs::create_dir_all(dir.path().join("a-empty")).unwrap();
        fs::write(dir.path().join("stray.zip"), b"").unwrap();

        let repo = FsPackageRepository::new(dir.path());
        let packages = repo.list_all().await.unwrap();
        let ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a-empty", "b-course"]);
        assert!(packages[0].location.is_none());
        assert_eq!(packages[1].public_path(), "/packages/b-course/content");

        assert!(repo.find_by_id("missing").await.unwrap().is_none());
        assert!(repo.find_by_id("..").await.is_err());
        let found = repo.find_by_id("b-course").await.unwrap().unwrap();
        assert_eq!(
            found.public_manifest().as_deref(),
            Some("/packages/b-course/content/imsmanifest.xml")
        );
    }

    #[tokio::test]
    async fn test_missing_packages_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = FsPackageRepository::new(dir.path().join("nope"));
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
