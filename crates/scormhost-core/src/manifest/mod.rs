//! Package manifests and launch resolution.

pub mod document;
pub mod resolver;
pub mod source;

pub use document::{FileRef, Item, ManifestDocument, Organization, Resource};
pub use resolver::{
    DEFAULT_FALLBACK_CANDIDATES, Launch, LaunchOrigin, LaunchResolver, directory_url, launch_url,
    resolve_launch_href,
};
pub use source::ManifestSource;
