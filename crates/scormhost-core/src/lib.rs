//! Domain layer of the SCORM host: the emulated LMS run-time, API
//! discovery, manifest launch resolution and tracking aggregation.

pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod package;
pub mod runtime;
pub mod tracking;

// Re-export common error type
pub use error::{Result, ScormHostError};
