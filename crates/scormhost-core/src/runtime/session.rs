//! The run-time session state machine behind both API shapes.

use std::sync::Arc;
use std::time::Duration;

use crate::runtime::deferred::DeferredNotify;
use crate::runtime::model::{
    DEFAULT_COMMIT_DELAY, DataMap, ErrorCode, ScormVersion, SessionState, diagnostic,
    error_string,
};
use crate::runtime::sink::CommitSink;
use crate::runtime::store::DataStore;

/// Construction parameters for a [`RuntimeSession`].
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Key this session persists under. Never shared with another session.
    pub storage_key: String,
    pub version: ScormVersion,
    /// Quiet period after the last `set_value` before the sink is notified.
    pub commit_delay: Duration,
}

impl RuntimeOptions {
    pub fn new(storage_key: impl Into<String>, version: ScormVersion) -> Self {
        Self {
            storage_key: storage_key.into(),
            version,
            commit_delay: DEFAULT_COMMIT_DELAY,
        }
    }

    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = delay;
        self
    }
}

/// One version's call-state machine and key/value data.
///
/// Every content-facing method runs to completion and reports failure only
/// through its return value and [`last_error`](Self::last_error).
/// `commit` and `terminate` cancel a pending deferred notification before
/// notifying, so each flush reaches the sink once.
pub struct RuntimeSession {
    storage_key: String,
    version: ScormVersion,
    state: SessionState,
    last_error: ErrorCode,
    data: DataMap,
    store: Arc<dyn DataStore>,
    sink: Arc<dyn CommitSink>,
    deferred: DeferredNotify,
    last_persistence_error: Option<String>,
}

impl RuntimeSession {
    pub fn new(
        options: RuntimeOptions,
        store: Arc<dyn DataStore>,
        sink: Arc<dyn CommitSink>,
    ) -> Self {
        let mut session = Self {
            storage_key: options.storage_key,
            version: options.version,
            state: SessionState::Uninitialized,
            last_error: ErrorCode::NoError,
            data: DataMap::new(),
            store,
            sink,
            deferred: DeferredNotify::new(options.commit_delay),
            last_persistence_error: None,
        };
        // Loaded up front so a commit before Initialize cannot clobber stored data.
        session.load();
        session
    }

    pub fn version(&self) -> ScormVersion {
        self.version
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Current data, as the sink would receive it.
    pub fn data(&self) -> &DataMap {
        &self.data
    }

    /// Most recent store failure, kept for diagnostics only.
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    pub fn has_pending_notification(&self) -> bool {
        self.deferred.is_pending()
    }

    /// Starts (or restarts) an attempt. Always succeeds.
    pub fn initialize(&mut self) -> bool {
        self.load();
        self.state = SessionState::Active;
        self.last_error = ErrorCode::NoError;
        tracing::debug!(
            "[RuntimeSession] Initialized {} session '{}' with {} stored keys",
            self.version,
            self.storage_key,
            self.data.len()
        );
        true
    }

    pub fn get_value(&mut self, element: &str) -> String {
        if self.state != SessionState::Active {
            self.last_error = ErrorCode::NotInitialized;
            return String::new();
        }
        self.last_error = ErrorCode::NoError;
        self.data.get(element).cloned().unwrap_or_default()
    }

    pub fn set_value(&mut self, element: &str, value: &str) -> bool {
        if self.state != SessionState::Active {
            self.last_error = ErrorCode::NotInitialized;
            return false;
        }
        self.data.insert(element.to_string(), value.to_string());
        self.last_error = ErrorCode::NoError;
        self.persist();
        self.deferred
            .schedule(self.sink.clone(), self.version, self.data.clone());
        true
    }

    pub fn commit(&mut self) -> bool {
        self.persist();
        self.last_error = ErrorCode::NoError;
        self.flush();
        true
    }

    pub fn terminate(&mut self) -> bool {
        self.persist();
        self.flush();
        self.state = SessionState::Terminated;
        self.last_error = ErrorCode::NoError;
        tracing::debug!(
            "[RuntimeSession] Terminated {} session '{}'",
            self.version,
            self.storage_key
        );
        true
    }

    pub fn last_error(&self) -> &'static str {
        self.last_error.code()
    }

    pub fn error_string(&self, code: &str) -> &'static str {
        error_string(code)
    }

    pub fn diagnostic(&self, code: &str) -> String {
        diagnostic(code)
    }

    /// Replaces the in-memory data with the stored map. On a failed read the
    /// current data is kept, so a later save cannot drop keys.
    fn load(&mut self) {
        match self.store.load(&self.storage_key) {
            Ok(data) => self.data = data,
            Err(e) => {
                tracing::warn!(
                    "[RuntimeSession] Failed to load data for '{}', keeping {} in-memory keys: {}",
                    self.storage_key,
                    self.data.len(),
                    e
                );
                self.last_persistence_error = Some(e.to_string());
            }
        }
    }

    fn persist(&mut self) {
        match self.store.save(&self.storage_key, &self.data) {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => {
                tracing::warn!(
                    "[RuntimeSession] Failed to persist data for '{}': {}",
                    self.storage_key,
                    e
                );
                self.last_persistence_error = Some(e.to_string());
            }
        }
    }

    fn flush(&mut self) {
        if self.deferred.cancel() {
            tracing::debug!(
                "[RuntimeSession] Superseded pending notification for '{}'",
                self.storage_key
            );
        }
        self.sink.notify(self.version, self.data.clone());
    }
}
