use std::fmt;
use std::sync::Arc;

use scormhost_core::discovery::{Frame, RuntimeClient, WindowContext};
use scormhost_core::manifest::Launch;
use scormhost_core::package::{MANIFEST_FILE_NAME, Package, validate_package_id};
use scormhost_core::runtime::{InstalledRuntime, ScormVersion, install_runtime};
use scormhost_core::tracking::VisitReceipt;
use scormhost_core::Result;
use serde::Serialize;

use crate::player::commit_sink::{LastSnapshot, TrackingCommitSink};
use crate::player::context::PlayerContext;

/// Whether the player has something to put in the content frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LaunchStatus {
    Ready(Launch),
    NotFound,
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStatus::Ready(launch) => write!(f, "{}", launch.url),
            LaunchStatus::NotFound => {
                write!(f, "{} not parsed or launch file not found.", MANIFEST_FILE_NAME)
            }
        }
    }
}

/// One launch of one package: the installed run-time, the visit it was
/// recorded under, and where the content lives.
///
/// The host talks to the run-time through the same discovery path content
/// uses, so [`mark_complete`](Self::mark_complete) and [`close`](Self::close)
/// behave exactly like calls from the content frame.
pub struct PlayerSession {
    package_id: String,
    package: Option<Package>,
    frame: Arc<Frame>,
    installed: InstalledRuntime,
    sink: Arc<TrackingCommitSink>,
    client: RuntimeClient,
    visit: Option<VisitReceipt>,
    launch: Option<Launch>,
    closed: bool,
}

impl PlayerSession {
    /// Installs both API shapes for `package_id`, records a visit and
    /// resolves the launch URL.
    ///
    /// Package lookup failures fall back to `/packages/<id>`; visit and
    /// launch failures are logged and leave the respective field empty.
    pub async fn open(context: &PlayerContext, package_id: &str) -> Result<Self> {
        validate_package_id(package_id)?;

        let package = match context.packages().find_by_id(package_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("[PlayerSession] Lookup of '{}' failed: {}", package_id, e);
                None
            }
        };
        let (base_path, manifest_path) = match &package {
            Some(pkg) => {
                let base = pkg.public_path();
                let manifest = pkg
                    .public_manifest()
                    .unwrap_or_else(|| format!("{}/{}", base, MANIFEST_FILE_NAME));
                (base, manifest)
            }
            None => {
                let base = format!("/packages/{}", package_id);
                let manifest = format!("{}/{}", base, MANIFEST_FILE_NAME);
                (base, manifest)
            }
        };

        let frame = Frame::top(format!("player:{}", package_id));
        let sink = Arc::new(TrackingCommitSink::new(
            package_id,
            context.tracking().clone(),
        ));
        let installed = install_runtime(
            &frame,
            &format!("scorm:{}", package_id),
            None,
            context.store().clone(),
            sink.clone(),
            context.commit_delay(),
        );

        let visit = match context.tracking().record_visit(package_id).await {
            Ok(receipt) => {
                sink.set_visit_id(Some(receipt.visit_id.clone()));
                Some(receipt)
            }
            Err(e) => {
                tracing::warn!("[PlayerSession] Visit for '{}' not recorded: {}", package_id, e);
                None
            }
        };

        let manifest_url = context.public_url(&manifest_path)?;
        let base_url = context.public_url(&base_path)?;
        let launch = match context.resolver().resolve(&manifest_url, &base_url).await {
            Ok(launch) => Some(launch),
            Err(e) => {
                tracing::warn!("[PlayerSession] No launch for '{}': {}", package_id, e);
                None
            }
        };

        tracing::info!(
            "[PlayerSession] Opened '{}' (visit {:?})",
            package_id,
            visit.as_ref().map(|v| v.visit_id.as_str())
        );

        let client = RuntimeClient::new(frame.clone() as Arc<dyn WindowContext>);
        Ok(Self {
            package_id: package_id.to_string(),
            package,
            frame,
            installed,
            sink,
            client,
            visit,
            launch,
            closed: false,
        })
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    /// Host window the run-time is installed on. Content frames are
    /// children of it.
    pub fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }

    pub fn installed(&self) -> &InstalledRuntime {
        &self.installed
    }

    pub fn visit(&self) -> Option<&VisitReceipt> {
        self.visit.as_ref()
    }

    pub fn launch(&self) -> Option<&Launch> {
        self.launch.as_ref()
    }

    pub fn launch_status(&self) -> LaunchStatus {
        match &self.launch {
            Some(launch) => LaunchStatus::Ready(launch.clone()),
            None => LaunchStatus::NotFound,
        }
    }

    pub fn last_snapshot(&self) -> Option<LastSnapshot> {
        self.sink.last_snapshot()
    }

    /// API shape in use, as discovery sees it.
    pub fn version(&mut self) -> Option<ScormVersion> {
        self.client.version()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes completion fields for whichever shape is in use, then commits.
    pub fn mark_complete(&mut self) -> bool {
        let fields: &[(&str, &str)] = match self.client.version() {
            Some(ScormVersion::Scorm2004) => &[
                ("cmi.completion_status", "completed"),
                ("cmi.success_status", "passed"),
            ],
            Some(ScormVersion::Scorm12) => &[
                ("cmi.core.lesson_status", "completed"),
                ("cmi.core.score.raw", "100"),
            ],
            None => return false,
        };
        for (element, value) in fields {
            self.client.set_value(element, value);
        }
        self.client.commit()
    }

    /// Commits, terminates, and waits for the resulting tracking writes.
    pub async fn close(&mut self) -> bool {
        if self.closed {
            return true;
        }
        let committed = self.client.commit();
        let terminated = self.client.terminate();
        self.sink.drain().await;
        self.closed = true;
        tracing::info!("[PlayerSession] Closed '{}'", self.package_id);
        committed && terminated
    }
}
