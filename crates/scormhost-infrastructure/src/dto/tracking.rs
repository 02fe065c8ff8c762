//! On-disk shapes for tracking and visit logs.

use serde::{Deserialize, Serialize};

use scormhost_core::tracking::{TrackingEntry, VisitLog, VisitRecord};

/// `tracking/<package>.json`: a plain array of entries.
pub type TrackingFileDTO = Vec<TrackingEntry>;

/// `visits/<package>.json`.
///
/// Older files hold just the visit count; those load with no visit records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisitsFileDTO {
    Log {
        count: u64,
        #[serde(default)]
        visits: Vec<VisitRecord>,
    },
    Count(u64),
}

impl Default for VisitsFileDTO {
    fn default() -> Self {
        VisitsFileDTO::Log {
            count: 0,
            visits: Vec::new(),
        }
    }
}

impl From<VisitsFileDTO> for VisitLog {
    fn from(dto: VisitsFileDTO) -> Self {
        match dto {
            VisitsFileDTO::Log { count, visits } => VisitLog { count, visits },
            VisitsFileDTO::Count(count) => VisitLog {
                count,
                visits: Vec::new(),
            },
        }
    }
}

impl From<VisitLog> for VisitsFileDTO {
    fn from(log: VisitLog) -> Self {
        VisitsFileDTO::Log {
            count: log.count,
            visits: log.visits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_count_reads_as_log() {
        let dto: VisitsFileDTO = serde_json::from_str("4").unwrap();
        let log = VisitLog::from(dto);
        assert_eq!(log.count, 4);
        assert!(log.visits.is_empty());
    }

    #[test]
    fn test_log_shape() {
        let dto: VisitsFileDTO = serde_json::from_str(
            r#"{"count":2,"visits":[{"id":"loyw3v28-abc123","startedAt":1700000000000}]}"#,
        )
        .unwrap();
        let log = VisitLog::from(dto);
        assert_eq!(log.count, 2);
        assert_eq!(log.visits[0].started_at, 1_700_000_000_000);

        let written = serde_json::to_value(VisitsFileDTO::from(log)).unwrap();
        assert_eq!(written["visits"][0]["id"], "loyw3v28-abc123");
    }
}
