//! Tracking log and visit models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::runtime::model::{DataMap, ScormVersion};

/// Bucket for entries that were recorded without a visit id.
pub const UNKNOWN_VISIT: &str = "unknown";

/// One commit notification as recorded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub package_id: String,
    /// Unix milliseconds at which the entry was recorded.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ScormVersion>,
    #[serde(default)]
    pub data: DataMap,
}

impl TrackingEntry {
    /// Visit bucket this entry belongs to.
    pub fn visit_key(&self) -> &str {
        match self.visit_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => UNKNOWN_VISIT,
        }
    }
}

/// A single launch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: String,
    pub started_at: i64,
}

/// All visits recorded for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLog {
    /// Running total; may exceed `visits.len()` for logs migrated from the
    /// count-only format.
    pub count: u64,
    #[serde(default)]
    pub visits: Vec<VisitRecord>,
}

impl VisitLog {
    pub fn record(&mut self, visit: VisitRecord) {
        self.count += 1;
        self.visits.push(visit);
    }

    pub fn find(&self, visit_id: &str) -> Option<&VisitRecord> {
        self.visits.iter().find(|v| v.id == visit_id)
    }
}

/// Returned when a visit is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitReceipt {
    pub package_id: String,
    pub count: u64,
    pub visit_id: String,
}

/// All entries of one visit folded into a single view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSnapshot {
    pub visit_id: String,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ScormVersion>,
    pub data: DataMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Builds a visit id: base-36 start time plus six random characters.
pub fn new_visit_id(started_at: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", to_base36(started_at.max(0) as u64), &random[..6])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
