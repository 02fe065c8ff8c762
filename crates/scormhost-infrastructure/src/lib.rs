pub mod config_service;
pub mod dto;
pub mod file_tracking_repository;
pub mod json_data_store;
pub mod manifest_source;
pub mod package_locator;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_tracking_repository::FileTrackingRepository;
pub use crate::json_data_store::JsonDataStore;
pub use crate::manifest_source::{FileManifestSource, HostManifestSource, HttpManifestSource};
pub use crate::package_locator::{FsPackageRepository, find_manifest};
pub use crate::paths::HostPaths;
