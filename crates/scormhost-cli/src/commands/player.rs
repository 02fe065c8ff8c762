use anyhow::Result;
use scormhost_application::player::LastSnapshot;
use scormhost_application::{LaunchStatus, PlayerContext};
use scormhost_core::runtime::ScormVersion;
use scormhost_core::tracking::VisitReceipt;
use serde::Serialize;

use super::packages::PackageView;
use super::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchView {
    package_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<PackageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visit: Option<VisitReceipt>,
    launch: LaunchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<ScormVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_snapshot: Option<LastSnapshot>,
}

pub async fn launch(context: &PlayerContext, id: &str, complete: bool) -> Result<()> {
    let mut session = context.open(id).await?;

    if let LaunchStatus::NotFound = session.launch_status() {
        tracing::warn!("[CLI] {}", session.launch_status());
    }

    if complete {
        if !session.mark_complete() {
            tracing::warn!("[CLI] Mark complete was not accepted for '{}'", id);
        }
        session.close().await;
    }

    let view = LaunchView {
        package_id: session.package_id().to_string(),
        package: session.package().map(PackageView::from),
        visit: session.visit().cloned(),
        launch: session.launch_status(),
        version: session.version(),
        last_snapshot: session.last_snapshot(),
    };
    print_json(&view)
}
