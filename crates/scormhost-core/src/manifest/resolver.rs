//! Launch resolution: which document a package frame should load.

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::error::{Result, ScormHostError};
use crate::manifest::document::ManifestDocument;
use crate::manifest::source::ManifestSource;

/// Conventional entry points tried when the manifest yields nothing.
pub const DEFAULT_FALLBACK_CANDIDATES: [&str; 5] = [
    "shared/launchpage.html",
    "index.html",
    "launch.html",
    "story.html",
    "scormdriver/indexAPI.html",
];

/// Picks the entry-point `href` from a parsed manifest.
///
/// Precedence, first match wins:
/// 1. first referencing item of the default organization,
/// 2. first referencing item of any organization, in document order,
///    (the ref from 1 or 2 must resolve to a resource with an `href`)
/// 3. first resource whose `scormType` is `sco`,
/// 4. first resource with any `href`,
/// 5. first `file` whose `href` ends in `.htm`/`.html`.
pub fn resolve_launch_href(doc: &ManifestDocument) -> Option<String> {
    let launch_ref = doc
        .default_org()
        .and_then(|org| org.first_ref())
        .or_else(|| doc.organizations.iter().find_map(|org| org.first_ref()));

    if let Some(href) = launch_ref.and_then(|r| doc.resource_href(r)) {
        return Some(href.to_string());
    }

    doc.resources
        .iter()
        .filter(|r| r.is_sco())
        .find_map(|r| r.href.clone())
        .or_else(|| doc.resources.iter().find_map(|r| r.href.clone()))
        .or_else(|| {
            doc.files
                .iter()
                .find(|f| is_html(&f.href))
                .map(|f| f.href.clone())
        })
}

fn is_html(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Makes `href` absolute against the manifest's own location.
pub fn launch_url(manifest_url: &Url, href: &str) -> Result<Url> {
    Ok(manifest_url.join(href.trim())?)
}

/// Where a launch URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOrigin {
    Manifest,
    /// Best-effort guess from the conventional candidate list.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Launch {
    pub url: Url,
    pub href: String,
    pub origin: LaunchOrigin,
}

/// Fetches a manifest and resolves the launch URL, falling back to the
/// first conventional candidate when the manifest cannot be fetched,
/// parsed, or yields no entry point.
pub struct LaunchResolver {
    source: Arc<dyn ManifestSource>,
    fallback_candidates: Vec<String>,
}

impl LaunchResolver {
    pub fn new(source: Arc<dyn ManifestSource>) -> Self {
        Self {
            source,
            fallback_candidates: DEFAULT_FALLBACK_CANDIDATES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn with_fallback_candidates(mut self, candidates: Vec<String>) -> Self {
        self.fallback_candidates = candidates;
        self
    }

    pub fn fallback_candidates(&self) -> &[String] {
        &self.fallback_candidates
    }

    /// Resolves the launch for a package whose manifest lives at
    /// `manifest_url` and whose content directory is `base_url`.
    ///
    /// Errors only when not even a fallback URL can be built.
    pub async fn resolve(&self, manifest_url: &Url, base_url: &Url) -> Result<Launch> {
        match self.resolve_from_manifest(manifest_url).await {
            Ok(Some(launch)) => return Ok(launch),
            Ok(None) => tracing::info!(
                "[LaunchResolver] Manifest {} declares no entry point, using fallback",
                manifest_url
            ),
            Err(e) => tracing::warn!(
                "[LaunchResolver] Manifest {} unusable, using fallback: {}",
                manifest_url,
                e
            ),
        }
        self.fallback(base_url)
    }

    async fn resolve_from_manifest(&self, manifest_url: &Url) -> Result<Option<Launch>> {
        let xml = self.source.fetch_text(manifest_url).await?;
        let doc = ManifestDocument::parse(&xml)?;
        let Some(href) = resolve_launch_href(&doc) else {
            return Ok(None);
        };
        let url = launch_url(manifest_url, &href)?;
        tracing::debug!("[LaunchResolver] Resolved '{}' to {}", href, url);
        Ok(Some(Launch {
            url,
            href,
            origin: LaunchOrigin::Manifest,
        }))
    }

    /// The first fallback candidate under `base_url`.
    pub fn fallback(&self, base_url: &Url) -> Result<Launch> {
        let candidate = self
            .fallback_candidates
            .first()
            .ok_or_else(|| ScormHostError::config("no fallback launch candidates configured"))?;
        let url = directory_url(base_url).join(candidate)?;
        Ok(Launch {
            url,
            href: candidate.clone(),
            origin: LaunchOrigin::Fallback,
        })
    }
}

/// `base` with a trailing slash, so joins stay inside it.
pub fn directory_url(base: &Url) -> Url {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir
}
