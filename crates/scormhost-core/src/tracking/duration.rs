//! Session-time durations and the numbered per-visit view.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::runtime::model::DataMap;
use crate::tracking::model::{CombinedSnapshot, VisitLog, VisitRecord};

/// `P[nD][T[nH][nM][n[.n]S]]`, any case.
static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^P(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]+)?)S)?)?$",
    )
    .expect("ISO duration pattern is valid")
});

/// `HH:MM:SS[.ss]` with two or more hour digits.
static CLOCK_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2,}):([0-5]?[0-9]):([0-5]?[0-9](?:\.[0-9]+)?)$")
        .expect("clock duration pattern is valid")
});

/// Converts a SCORM 2004 or SCORM 1.2 time span to seconds, rounded to two
/// decimals. Blank or unrecognised input yields `None`.
pub fn parse_duration_seconds(value: &str) -> Option<f64> {
    let input = value.trim();
    if input.is_empty() {
        return None;
    }

    let total = if let Some(caps) = ISO_DURATION.captures(input) {
        let part = |i: usize| -> f64 {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0)
        };
        part(1) * 86_400.0 + part(2) * 3_600.0 + part(3) * 60.0 + part(4)
    } else if let Some(caps) = CLOCK_DURATION.captures(input) {
        let part = |i: usize| -> Option<f64> { caps.get(i)?.as_str().parse().ok() };
        part(1)? * 3_600.0 + part(2)? * 60.0 + part(3)?
    } else {
        return None;
    };

    Some((total * 100.0).round() / 100.0)
}

/// Session time of a snapshot in seconds. `cmi.session_time` wins over
/// `cmi.core.session_time` unless it is blank.
pub fn session_seconds(data: &DataMap) -> Option<f64> {
    let raw = data
        .get("cmi.session_time")
        .filter(|v| !v.is_empty())
        .or_else(|| data.get("cmi.core.session_time"))?;
    parse_duration_seconds(raw)
}

/// A combined snapshot with its launch number and session length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    #[serde(flatten)]
    pub snapshot: CombinedSnapshot,
    /// 1-based position among the package's visits ordered by start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_seconds: Option<f64>,
}

/// Numbers each visit by start time. Ties keep their recorded order.
pub fn visit_numbers(visits: &[VisitRecord]) -> HashMap<&str, usize> {
    let mut ordered: Vec<&VisitRecord> = visits.iter().collect();
    ordered.sort_by_key(|v| v.started_at);
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v.id.as_str(), i + 1))
        .collect()
}

/// Attaches visit numbers and session seconds to `snapshots`.
pub fn summarize(snapshots: Vec<CombinedSnapshot>, visits: &[VisitRecord]) -> Vec<VisitSummary> {
    let numbers = visit_numbers(visits);
    snapshots
        .into_iter()
        .map(|snapshot| VisitSummary {
            visit_number: numbers.get(snapshot.visit_id.as_str()).copied(),
            session_seconds: session_seconds(&snapshot.data),
            snapshot,
        })
        .collect()
}

/// [`summarize`] for every package in `snapshots`.
pub fn summarize_all(
    snapshots: BTreeMap<String, Vec<CombinedSnapshot>>,
    visits: &BTreeMap<String, VisitLog>,
) -> BTreeMap<String, Vec<VisitSummary>> {
    snapshots
        .into_iter()
        .map(|(package_id, package_snapshots)| {
            let package_visits = visits
                .get(&package_id)
                .map(|log| log.visits.as_slice())
                .unwrap_or(&[]);
            let summaries = summarize(package_snapshots, package_visits);
            (package_id, summaries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(visit_id: &str, data: &[(&str, &str)]) -> CombinedSnapshot {
        CombinedSnapshot {
            visit_id: visit_id.into(),
            first_timestamp: 0,
            last_timestamp: 0,
            version: None,
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            started_at: None,
        }
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_duration_seconds("PT1H2M3.456S"), Some(3723.46));
        assert_eq!(parse_duration_seconds("P1DT2H"), Some(93_600.0));
        assert_eq!(parse_duration_seconds(" pt12.28s "), Some(12.28));
        assert_eq!(parse_duration_seconds("PT45M"), Some(2_700.0));
    }

    #[test]
    fn clock_durations() {
        assert_eq!(parse_duration_seconds("00:01:30.5"), Some(90.5));
        assert_eq!(parse_duration_seconds("0102:00:00"), Some(367_200.0));
        assert_eq!(parse_duration_seconds("12:5:07"), Some(43_507.0));
    }

    #[test]
    fn unparseable_durations_are_empty() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("   "), None);
        assert_eq!(parse_duration_seconds("abc"), None);
        assert_eq!(parse_duration_seconds("1:02:03"), None);
        assert_eq!(parse_duration_seconds("00:61:00"), None);
        assert_eq!(parse_duration_seconds("PT1.5H"), None);
    }

    #[test]
    fn session_time_prefers_2004_key() {
        let mut data = DataMap::new();
        data.insert("cmi.core.session_time".into(), "00:00:10".into());
        assert_eq!(session_seconds(&data), Some(10.0));

        data.insert("cmi.session_time".into(), String::new());
        assert_eq!(session_seconds(&data), Some(10.0));

        data.insert("cmi.session_time".into(), "PT20S".into());
        assert_eq!(session_seconds(&data), Some(20.0));

        data.insert("cmi.session_time".into(), "soon".into());
        assert_eq!(session_seconds(&data), None);
        assert_eq!(session_seconds(&DataMap::new()), None);
    }

    #[test]
    fn visits_are_numbered_by_start_time() {
        let visits = vec![
            VisitRecord { id: "late".into(), started_at: 300 },
            VisitRecord { id: "early".into(), started_at: 100 },
            VisitRecord { id: "middle".into(), started_at: 200 },
        ];
        let summaries = summarize(
            vec![
                snapshot("middle", &[("cmi.session_time", "PT1M")]),
                snapshot("late", &[]),
                snapshot("unknown", &[("cmi.core.session_time", "00:00:05")]),
                snapshot("early", &[]),
            ],
            &visits,
        );

        let numbered: Vec<(&str, Option<usize>)> = summaries
            .iter()
            .map(|s| (s.snapshot.visit_id.as_str(), s.visit_number))
            .collect();
        assert_eq!(
            numbered,
            vec![
                ("middle", Some(2)),
                ("late", Some(3)),
                ("unknown", None),
                ("early", Some(1)),
            ]
        );
        assert_eq!(summaries[0].session_seconds, Some(60.0));
        assert_eq!(summaries[1].session_seconds, None);
        assert_eq!(summaries[2].session_seconds, Some(5.0));
    }

    #[test]
    fn summary_serializes_flat() {
        let summary = VisitSummary {
            snapshot: snapshot("v1", &[]),
            visit_number: Some(1),
            session_seconds: Some(12.5),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["visitId"], "v1");
        assert_eq!(json["visitNumber"], 1);
        assert_eq!(json["sessionSeconds"], 12.5);
    }
}
