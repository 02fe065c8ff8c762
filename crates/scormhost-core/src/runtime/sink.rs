//! Commit notification seam implemented by the hosting page.

use crate::runtime::model::{DataMap, ScormVersion};

/// Receives snapshots whenever a session flushes its data.
///
/// A sink may see the same logical state twice (two `Commit` calls with no
/// write in between) and must tolerate that. Sinks are invoked while the
/// session is borrowed, so they must not call back into the adapter.
pub trait CommitSink: Send + Sync {
    fn notify(&self, version: ScormVersion, snapshot: DataMap);
}

impl<F> CommitSink for F
where
    F: Fn(ScormVersion, DataMap) + Send + Sync,
{
    fn notify(&self, version: ScormVersion, snapshot: DataMap) {
        self(version, snapshot)
    }
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CommitSink for NullSink {
    fn notify(&self, _version: ScormVersion, _snapshot: DataMap) {}
}
