//! ManifestSource implementations: local files and HTTP.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scormhost_core::manifest::ManifestSource;
use scormhost_core::{Result, ScormHostError};
use url::Url;

/// Reads manifests from disk.
///
/// Handles `file://` URLs directly. A mount maps a public URL prefix onto a
/// local directory, so `http://host/packages/x/imsmanifest.xml` can be read
/// from `<packages_dir>/x/imsmanifest.xml` without a server.
#[derive(Debug, Clone, Default)]
pub struct FileManifestSource {
    mounts: Vec<(Url, Url)>,
}

impl FileManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves URLs under `prefix` from `dir`.
    pub fn with_mount(mut self, prefix: Url, dir: &Path) -> Result<Self> {
        let dir_url = Url::from_directory_path(dir).map_err(|_| {
            ScormHostError::invalid_input(format!("{:?} is not an absolute directory", dir))
        })?;
        let mut prefix = prefix;
        if !prefix.path().ends_with('/') {
            let path = format!("{}/", prefix.path());
            prefix.set_path(&path);
        }
        self.mounts.push((prefix, dir_url));
        Ok(self)
    }

    /// Local file backing `url`, if this source can serve it.
    pub fn local_path(&self, url: &Url) -> Option<PathBuf> {
        if url.scheme() == "file" {
            return url.to_file_path().ok();
        }
        self.mounts.iter().find_map(|(prefix, dir_url)| {
            if url.origin() != prefix.origin() {
                return None;
            }
            let rel = url.path().strip_prefix(prefix.path())?;
            dir_url.join(rel).ok()?.to_file_path().ok()
        })
    }
}

#[async_trait]
impl ManifestSource for FileManifestSource {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let path = self
            .local_path(url)
            .ok_or_else(|| ScormHostError::not_found("manifest", url.as_str()))?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScormHostError::not_found("manifest", url.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Fetches manifests over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpManifestSource {
    client: reqwest::Client,
}

impl HttpManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ScormHostError::Network(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScormHostError::not_found("manifest", url.as_str()));
        }
        if !status.is_success() {
            return Err(ScormHostError::Network(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ScormHostError::Network(format!("Reading {} failed: {}", url, e)))
    }
}

/// Serves from disk when a file or mount matches, otherwise over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HostManifestSource {
    local: FileManifestSource,
    http: HttpManifestSource,
}

impl HostManifestSource {
    pub fn new(local: FileManifestSource, http: HttpManifestSource) -> Self {
        Self { local, http }
    }
}

#[async_trait]
impl ManifestSource for HostManifestSource {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        if self.local.local_path(url).is_some() {
            tracing::debug!("[ManifestSource] Reading {} from disk", url);
            return self.local.fetch_text(url).await;
        }
        match url.scheme() {
            "http" | "https" => {
                tracing::debug!("[ManifestSource] Fetching {}", url);
                self.http.fetch_text(url).await
            }
            other => Err(ScormHostError::invalid_input(format!(
                "unsupported manifest URL scheme '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mount_maps_public_urls() {
        let dir = TempDir::new().unwrap();
        let source = FileManifestSource::new()
            .with_mount(
                Url::parse("http://localhost:4300/packages").unwrap(),
                dir.path(),
            )
            .unwrap();

        let url = Url::parse("http://localhost:4300/packages/c1/sub%20dir/imsmanifest.xml")
            .unwrap();
        assert_eq!(
            source.local_path(&url).unwrap(),
            dir.path().join("c1/sub dir/imsmanifest.xml")
        );

        let other_host = Url::parse("http://example.com/packages/c1/imsmanifest.xml").unwrap();
        assert!(source.local_path(&other_host).is_none());
        let outside = Url::parse("http://localhost:4300/api/packages").unwrap();
        assert!(source.local_path(&outside).is_none());
    }

    #[tokio::test]
    async fn test_reads_mounted_and_file_urls() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("c1")).unwrap();
        std::fs::write(dir.path().join("c1/imsmanifest.xml"), "<manifest/>").unwrap();

        let source = HostManifestSource::new(
            FileManifestSource::new()
                .with_mount(
                    Url::parse("http://localhost:4300/packages/").unwrap(),
                    dir.path(),
                )
                .unwrap(),
            HttpManifestSource::new(),
        );

        let mounted = Url::parse("http://localhost:4300/packages/c1/imsmanifest.xml").unwrap();
        assert_eq!(source.fetch_text(&mounted).await.unwrap(), "<manifest/>");

        let file_url = Url::from_file_path(dir.path().join("c1/imsmanifest.xml")).unwrap();
        assert_eq!(source.fetch_text(&file_url).await.unwrap(), "<manifest/>");

        let missing = Url::parse("http://localhost:4300/packages/c2/imsmanifest.xml").unwrap();
        assert!(source.fetch_text(&missing).await.unwrap_err().is_not_found());

        let ftp = Url::parse("ftp://localhost/imsmanifest.xml").unwrap();
        assert!(source.fetch_text(&ftp).await.unwrap_err().is_invalid_input());
    }
}
