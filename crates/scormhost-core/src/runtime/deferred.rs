//! Single-slot deferred commit notification.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::runtime::model::{DataMap, ScormVersion};
use crate::runtime::sink::CommitSink;

/// At most one pending notification per session.
///
/// Scheduling replaces whatever is pending, so a burst of writes yields a
/// single notification `delay` after the last one. The task runs on the
/// ambient tokio runtime; dropping the slot detaches (does not cancel) it.
#[derive(Debug)]
pub struct DeferredNotify {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DeferredNotify {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending notification and schedules a new one.
    ///
    /// Returns `false` when no runtime is available to run the timer.
    pub fn schedule(
        &mut self,
        sink: Arc<dyn CommitSink>,
        version: ScormVersion,
        snapshot: DataMap,
    ) -> bool {
        self.cancel();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!(
                    "[DeferredNotify] No async runtime, skipping deferred notification for {}",
                    version
                );
                return false;
            }
        };

        let delay = self.delay;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(
                "[DeferredNotify] Firing deferred notification: version={}, keys={}",
                version,
                snapshot.len()
            );
            sink.notify(version, snapshot);
        }));
        true
    }

    /// Aborts the pending notification, if any.
    ///
    /// Returns `true` if a notification was still waiting to fire.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}
