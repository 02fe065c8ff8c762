//! Installing run-time adapters onto a host window.

use std::sync::Arc;
use std::time::Duration;

use crate::discovery::Frame;
use crate::runtime::adapter::{Adapter, Scorm12Api, Scorm2004Api, SharedSession, share};
use crate::runtime::model::ScormVersion;
use crate::runtime::session::{RuntimeOptions, RuntimeSession};
use crate::runtime::sink::CommitSink;
use crate::runtime::store::DataStore;

/// Handles to the adapters [`install_runtime`] put on a window.
#[derive(Debug, Clone, Default)]
pub struct InstalledRuntime {
    pub scorm2004: Option<Scorm2004Api>,
    pub scorm12: Option<Scorm12Api>,
}

impl InstalledRuntime {
    pub fn session(&self, version: ScormVersion) -> Option<&SharedSession> {
        match version {
            ScormVersion::Scorm2004 => self.scorm2004.as_ref().map(Scorm2004Api::session),
            ScormVersion::Scorm12 => self.scorm12.as_ref().map(Scorm12Api::session),
        }
    }

    pub fn versions(&self) -> Vec<ScormVersion> {
        ScormVersion::DISCOVERY_ORDER
            .into_iter()
            .filter(|v| self.session(*v).is_some())
            .collect()
    }
}

/// Installs adapters for `version`, or for both shapes when `None`.
///
/// Each shape gets its own session persisted under
/// `<base_key>:<version suffix>`, so content probing both sees independent
/// state. Both sessions report to the same sink.
pub fn install_runtime(
    frame: &Frame,
    base_key: &str,
    version: Option<ScormVersion>,
    store: Arc<dyn DataStore>,
    sink: Arc<dyn CommitSink>,
    commit_delay: Duration,
) -> InstalledRuntime {
    let mut installed = InstalledRuntime::default();

    for v in ScormVersion::DISCOVERY_ORDER {
        if version.is_some_and(|wanted| wanted != v) {
            continue;
        }
        let options =
            RuntimeOptions::new(v.storage_key(base_key), v).with_commit_delay(commit_delay);
        let session = share(RuntimeSession::new(options, store.clone(), sink.clone()));
        match v {
            ScormVersion::Scorm2004 => {
                let api = Scorm2004Api::new(session);
                frame.install(Adapter::Scorm2004(api.clone()));
                installed.scorm2004 = Some(api);
            }
            ScormVersion::Scorm12 => {
                let api = Scorm12Api::new(session);
                frame.install(Adapter::Scorm12(api.clone()));
                installed.scorm12 = Some(api);
            }
        }
    }

    tracing::info!(
        "[Runtime] Installed {:?} on '{}' under '{}'",
        installed.versions(),
        frame.name(),
        base_key
    );
    installed
}
