//! Where manifest text comes from.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Fetches raw manifest XML. Any failure sends the resolver to its
/// fallback candidates.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}
