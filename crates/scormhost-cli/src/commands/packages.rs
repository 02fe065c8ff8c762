use anyhow::{Result, bail};
use scormhost_application::PlayerContext;
use scormhost_core::package::Package;
use serde::Serialize;

use super::print_json;

/// A package as the host serves it.
#[derive(Serialize)]
pub struct PackageView {
    pub id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

impl From<&Package> for PackageView {
    fn from(package: &Package) -> Self {
        Self {
            id: package.id.clone(),
            path: package.public_path(),
            manifest: package.public_manifest(),
        }
    }
}

pub async fn list(context: &PlayerContext) -> Result<()> {
    let packages = context.packages().list_all().await?;
    let views: Vec<PackageView> = packages.iter().map(PackageView::from).collect();
    print_json(&views)
}

pub async fn show(context: &PlayerContext, id: &str) -> Result<()> {
    match context.packages().find_by_id(id).await? {
        Some(package) => print_json(&PackageView::from(&package)),
        None => bail!("Package '{}' not found", id),
    }
}
