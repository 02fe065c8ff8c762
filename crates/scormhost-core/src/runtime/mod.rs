//! Emulated LMS run-time: session state machine and the two API shapes.

pub mod adapter;
pub mod deferred;
pub mod install;
pub mod model;
pub mod session;
pub mod sink;
pub mod store;

pub use adapter::{Adapter, Scorm12Api, Scorm2004Api, SharedSession, share};
pub use install::{InstalledRuntime, install_runtime};
pub use model::{DEFAULT_COMMIT_DELAY, DataMap, ErrorCode, ScormVersion, SessionState};
pub use session::{RuntimeOptions, RuntimeSession};
pub use sink::{CommitSink, NullSink};
pub use store::{DataStore, MemoryDataStore};
