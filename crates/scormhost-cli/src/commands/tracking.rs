use anyhow::{Result, anyhow};
use scormhost_application::PlayerContext;
use scormhost_core::runtime::{DataMap, ScormVersion};
use scormhost_core::tracking::VisitRecord;
use serde::Serialize;

use super::print_json;

/// Parses `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_pair(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageVisits {
    package_id: String,
    count: u64,
    visits: Vec<VisitRecord>,
}

pub async fn track(
    context: &PlayerContext,
    id: &str,
    version: Option<ScormVersion>,
    visit: Option<String>,
    data: Vec<(String, String)>,
) -> Result<()> {
    let data: DataMap = data.into_iter().collect();
    let entry = context.tracking().track(id, version, data, visit).await?;
    print_json(&entry)
}

pub async fn entries(context: &PlayerContext, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) => print_json(&context.tracking().entries(id).await?),
        None => print_json(&context.tracking().all_entries().await?),
    }
}

pub async fn visit(context: &PlayerContext, id: &str) -> Result<()> {
    print_json(&context.tracking().record_visit(id).await?)
}

pub async fn visits(context: &PlayerContext, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) => {
            let log = context.tracking().visits(id).await?;
            print_json(&PackageVisits {
                package_id: id.to_string(),
                count: log.count,
                visits: log.visits,
            })
        }
        None => print_json(&context.tracking().all_visits().await?),
    }
}

pub async fn combined(context: &PlayerContext, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) => print_json(&context.tracking().summaries(id).await?),
        None => print_json(&context.tracking().summaries_all().await?),
    }
}
