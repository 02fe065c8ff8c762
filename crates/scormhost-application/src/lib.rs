//! Application layer for the SCORM host.
//!
//! Use cases that coordinate the domain run-time with file-backed
//! infrastructure: opening a player session and working with tracking data.

pub mod player;
pub mod tracking_service;

pub use player::{LaunchStatus, PlayerContext, PlayerSession, TrackingCommitSink};
pub use tracking_service::TrackingService;
