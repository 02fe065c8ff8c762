use std::sync::Arc;
use std::time::Duration;

use scormhost_core::config::HostConfig;
use scormhost_core::manifest::{LaunchResolver, ManifestSource, directory_url};
use scormhost_core::package::PackageRepository;
use scormhost_core::runtime::{DEFAULT_COMMIT_DELAY, DataStore};
use scormhost_core::tracking::TrackingRepository;
use scormhost_core::{Result, ScormHostError};
use scormhost_infrastructure::{
    FileManifestSource, FileTrackingRepository, FsPackageRepository, HostManifestSource,
    HostPaths, HttpManifestSource, JsonDataStore,
};
use url::Url;

use crate::player::session::PlayerSession;
use crate::tracking_service::TrackingService;

/// Collaborators shared by every player session of one host.
pub struct PlayerContext {
    packages: Arc<dyn PackageRepository>,
    tracking: Arc<TrackingService>,
    resolver: Arc<LaunchResolver>,
    store: Arc<dyn DataStore>,
    public_base_url: Url,
    commit_delay: Duration,
}

impl PlayerContext {
    pub fn new(
        packages: Arc<dyn PackageRepository>,
        tracking: Arc<TrackingService>,
        resolver: Arc<LaunchResolver>,
        store: Arc<dyn DataStore>,
        public_base_url: Url,
    ) -> Self {
        Self {
            packages,
            tracking,
            resolver,
            store,
            public_base_url: directory_url(&public_base_url),
            commit_delay: DEFAULT_COMMIT_DELAY,
        }
    }

    pub fn with_commit_delay(mut self, commit_delay: Duration) -> Self {
        self.commit_delay = commit_delay;
        self
    }

    /// Wires the file-backed stores under the configured directories.
    ///
    /// Manifests under `<public_base_url>/packages/` are read straight from
    /// the packages directory; other URLs go over HTTP.
    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let paths = HostPaths::from_config(config)?;
        let public_base_url = directory_url(&Url::parse(&config.public_base_url).map_err(
            |e| ScormHostError::config(format!("public_base_url '{}': {}", config.public_base_url, e)),
        )?);

        let packages_dir = std::path::absolute(paths.packages_dir())?;
        let local = FileManifestSource::new()
            .with_mount(public_base_url.join("packages/")?, &packages_dir)?;
        let source: Arc<dyn ManifestSource> =
            Arc::new(HostManifestSource::new(local, HttpManifestSource::new()));
        let resolver = LaunchResolver::new(source)
            .with_fallback_candidates(config.fallback_launch_candidates.clone());

        let packages = FsPackageRepository::new(packages_dir)
            .with_max_depth(config.manifest_search_depth);
        let tracking: Arc<dyn TrackingRepository> = Arc::new(FileTrackingRepository::new(
            paths.tracking_dir(),
            paths.visits_dir(),
        ));

        tracing::debug!(
            "[PlayerContext] Data in {:?}, packages in {:?}",
            paths.data_dir(),
            paths.packages_dir()
        );

        Ok(Self::new(
            Arc::new(packages),
            Arc::new(TrackingService::new(tracking)),
            Arc::new(resolver),
            Arc::new(JsonDataStore::new(paths.runtime_dir())),
            public_base_url,
        )
        .with_commit_delay(config.commit_delay()))
    }

    pub fn packages(&self) -> &Arc<dyn PackageRepository> {
        &self.packages
    }

    pub fn tracking(&self) -> &Arc<TrackingService> {
        &self.tracking
    }

    pub fn resolver(&self) -> &Arc<LaunchResolver> {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    pub fn public_base_url(&self) -> &Url {
        &self.public_base_url
    }

    pub fn commit_delay(&self) -> Duration {
        self.commit_delay
    }

    /// Absolute URL for a `/packages/...` public path.
    pub fn public_url(&self, public_path: &str) -> Result<Url> {
        Ok(self
            .public_base_url
            .join(public_path.trim_start_matches('/'))?)
    }

    pub async fn open(&self, package_id: &str) -> Result<PlayerSession> {
        PlayerSession::open(self, package_id).await
    }
}
