//! Run-time data model: versions, lifecycle states and error codes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScormHostError;

/// Element name → value map held by a run-time session.
///
/// Keys are dotted data-model element names (`cmi.core.lesson_status`).
pub type DataMap = BTreeMap<String, String>;

/// Default delay before a coalesced commit notification fires.
pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(800);

/// The two API shapes content may look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScormVersion {
    /// The legacy shape, installed as `API` with `LMS*` methods.
    #[serde(rename = "1.2")]
    Scorm12,
    /// The current shape, installed as `API_1484_11`.
    #[serde(rename = "2004")]
    Scorm2004,
}

impl ScormVersion {
    /// Order in which a single frame is probed.
    pub const DISCOVERY_ORDER: [ScormVersion; 2] = [ScormVersion::Scorm2004, ScormVersion::Scorm12];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScormVersion::Scorm12 => "1.2",
            ScormVersion::Scorm2004 => "2004",
        }
    }

    /// Suffix appended to a base storage key so the two shapes never share
    /// persisted state.
    pub fn storage_suffix(&self) -> &'static str {
        match self {
            ScormVersion::Scorm12 => "12",
            ScormVersion::Scorm2004 => "2004",
        }
    }

    /// Name of the window property the adapter is installed under.
    pub fn global_name(&self) -> &'static str {
        match self {
            ScormVersion::Scorm12 => "API",
            ScormVersion::Scorm2004 => "API_1484_11",
        }
    }

    /// Builds the storage key for this version from a base key.
    pub fn storage_key(&self, base: &str) -> String {
        format!("{}:{}", base, self.storage_suffix())
    }
}

impl fmt::Display for ScormVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScormVersion {
    type Err = ScormHostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.2" | "12" => Ok(ScormVersion::Scorm12),
            "2004" => Ok(ScormVersion::Scorm2004),
            other => Err(ScormHostError::invalid_input(format!(
                "unknown SCORM version '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle of a run-time session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Active,
    Terminated,
}

/// Error codes reported through `GetLastError`.
///
/// Only the two codes the emulated LMS needs are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoError,
    NotInitialized,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "0",
            ErrorCode::NotInitialized => "301",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(ErrorCode::NoError),
            "301" => Some(ErrorCode::NotInitialized),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "No error",
            ErrorCode::NotInitialized => "Not initialized",
        }
    }
}

/// Text returned by `GetErrorString` for codes outside the modeled set.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// `GetErrorString` lookup.
pub fn error_string(code: &str) -> &'static str {
    ErrorCode::from_code(code)
        .map(|c| c.message())
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
}

/// `GetDiagnostic` text; the code is echoed verbatim.
pub fn diagnostic(code: &str) -> String {
    format!("Diagnostic: {}", code)
}

/// Converts a boolean outcome into the wire representation.
pub fn wire_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
