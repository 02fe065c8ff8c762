//! Player use case: one launched package with its emulated run-time.

mod commit_sink;
mod context;
mod session;

pub use commit_sink::{LastSnapshot, TrackingCommitSink};
pub use context::PlayerContext;
pub use session::{LaunchStatus, PlayerSession};
