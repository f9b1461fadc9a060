//! Read-only reporting queries over stored missions.
//!
//! These back the dashboard views: overall totals, mission and profile tables,
//! recently active gliders and named statistics.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use storage::{GliderMission, MissionKey, MissionStore, PipelineMission, Profile};
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Missions that ended within this window count as recent.
pub const DEFAULT_RECENT_WINDOW: Duration = Duration::days(3);

/// Totals across every stored mission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionTotals {
    pub total_profiles: i64,
    pub glider_count: usize,
    pub total_seconds: i64,
    pub total_time: String,
    pub total_distance_km: i64,
}

/// One row of the missions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionRow {
    pub glider: i64,
    pub mission: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sea_name: String,
    pub total_distance_m: f64,
    pub total_depth: f64,
    pub duration_seconds: i64,
    /// Whole days between start and end
    pub days: i64,
    /// `None` when the mission lasted less than a day
    pub km_per_day: Option<f64>,
}

impl From<&GliderMission> for MissionRow {
    fn from(mission: &GliderMission) -> Self {
        let duration = mission.duration();
        let days = duration.num_days();
        let km_per_day = if days == 0 {
            None
        } else {
            Some(mission.total_distance_m / (1000.0 * days as f64))
        };

        Self {
            glider: mission.glider,
            mission: mission.mission,
            start: mission.start,
            end: mission.end,
            sea_name: mission.sea_name.clone(),
            total_distance_m: mission.total_distance_m,
            total_depth: mission.total_depth,
            duration_seconds: duration.num_seconds(),
            days,
            km_per_day,
        }
    }
}

/// Sum profiles, time at sea and distance across all missions.
pub async fn totals(store: &dyn MissionStore) -> Result<MissionTotals> {
    let missions = store.list_missions().await?;

    let mut total_profiles = 0;
    let mut gliders = HashSet::new();
    let mut total_time = Duration::zero();
    let mut total_distance_m = 0.0;

    for mission in &missions {
        total_profiles += mission.total_profiles;
        gliders.insert(mission.glider);
        total_time = total_time + mission.duration();
        total_distance_m += mission.total_distance_m;
    }

    debug!(missions = missions.len(), "Computed mission totals");

    let total_seconds = total_time.num_seconds();
    Ok(MissionTotals {
        total_profiles,
        glider_count: gliders.len(),
        total_seconds,
        total_time: pretty_duration(total_seconds),
        total_distance_km: (total_distance_m / 1000.0) as i64,
    })
}

/// Flattened view of all missions with duration and daily distance.
pub async fn missions_table(store: &dyn MissionStore) -> Result<Vec<MissionRow>> {
    let missions = store.list_missions().await?;
    Ok(missions.iter().map(MissionRow::from).collect())
}

/// Flattened view of all profiles.
pub async fn profiles_table(store: &dyn MissionStore) -> Result<Vec<Profile>> {
    Ok(store.list_profiles().await?)
}

/// Missions whose last profile is within `window` of now.
pub async fn recent_missions(store: &dyn MissionStore, window: Duration) -> Result<Vec<MissionKey>> {
    recent_missions_at(store, window, Utc::now()).await
}

/// Same as [`recent_missions`] with an explicit reference time.
pub async fn recent_missions_at(
    store: &dyn MissionStore,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<MissionKey>> {
    let missions = store.list_missions().await?;
    Ok(missions
        .iter()
        .filter(|m| now - m.end < window)
        .map(|m| m.key())
        .collect())
}

/// Value of a named statistic.
pub async fn stat(store: &dyn MissionStore, name: &str) -> Result<f64> {
    store
        .find_stat(name)
        .await?
        .map(|s| s.value)
        .ok_or_else(|| IngestionError::StatNotFound(name.to_string()))
}

pub async fn select_mission(
    store: &dyn MissionStore,
    glider: i64,
    mission: i64,
) -> Result<Option<GliderMission>> {
    Ok(store.find_mission(MissionKey::new(glider, mission)).await?)
}

/// Profiles of one mission ordered by profile number.
pub async fn mission_profiles(
    store: &dyn MissionStore,
    glider: i64,
    mission: i64,
) -> Result<Vec<Profile>> {
    Ok(store
        .mission_profiles(MissionKey::new(glider, mission))
        .await?)
}

/// Pipeline records filtered by whether they were configured via yml.
pub async fn pipeline_missions(
    store: &dyn MissionStore,
    yml_only: bool,
) -> Result<Vec<PipelineMission>> {
    Ok(store.pipeline_missions(yml_only).await?)
}

/// Render a number of seconds as e.g. `1 year, 12 days, 3 hours, 5 minutes`.
///
/// Leading zero units are omitted; zero renders as `0 minutes`.
pub fn pretty_duration(seconds: i64) -> String {
    const UNITS: [(&str, i64); 4] = [
        ("year", 365 * 86_400),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
    ];

    let mut remaining = seconds.max(0);
    let mut parts = Vec::new();
    for (name, size) in UNITS {
        let amount = remaining / size;
        remaining %= size;
        if amount == 0 && parts.is_empty() && name != "minute" {
            continue;
        }
        let plural = if amount == 1 { "" } else { "s" };
        parts.push(format!("{} {}{}", amount, name, plural));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_duration_zero() {
        assert_eq!(pretty_duration(0), "0 minutes");
    }

    #[test]
    fn test_pretty_duration_skips_leading_zero_units() {
        assert_eq!(pretty_duration(3 * 3600 + 60), "3 hours, 1 minute");
    }

    #[test]
    fn test_pretty_duration_keeps_inner_zero_units() {
        let seconds = 365 * 86_400 + 2 * 86_400 + 5 * 60;
        assert_eq!(pretty_duration(seconds), "1 year, 2 days, 0 hours, 5 minutes");
    }
}
