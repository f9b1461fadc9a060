//! Main Ingester struct for glider mission ingestion.

use std::sync::Arc;

use gridfile::{nanos_to_datetime, GliderDataset};
use storage::{GliderMission, MissionKey, MissionStore, Profile};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::present_variables;
use crate::distance::total_distance;
use crate::error::{IngestionError, Result};
use crate::metadata::{max_depth_per_profile, mission_header, mission_key};

/// Options for ingestion operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Expected number of profiles for a mission still in progress. Used to
    /// extrapolate total depth from the profiles transmitted so far.
    pub total_profiles: Option<i64>,
    /// The dataset is the final, recovered mission dataset
    pub mission_complete: bool,
}

impl IngestOptions {
    /// Near-real-time ingestion with an optional expected profile count.
    pub fn nrt(total_profiles: Option<i64>) -> Self {
        Self {
            total_profiles,
            mission_complete: false,
        }
    }

    /// Completed-mission ingestion.
    pub fn complete() -> Self {
        Self {
            total_profiles: None,
            mission_complete: true,
        }
    }
}

/// What happened to the stored mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No mission existed for this glider deployment
    Created,
    /// A previous mission and its profiles were replaced
    Replaced,
    /// The stored mission is complete and the dataset is not; nothing changed
    Blocked,
}

/// Result of an ingestion operation.
#[derive(Debug, Clone)]
pub struct IngestionResult {
    pub mission: GliderMission,
    pub outcome: IngestOutcome,
}

/// Core ingester for glider missions.
///
/// Turns one gridded dataset into a mission record plus one record per
/// profile, replacing whatever was stored for the same glider deployment.
#[derive(Clone)]
pub struct MissionIngester {
    store: Arc<dyn MissionStore>,
}

impl MissionIngester {
    /// Create a new MissionIngester.
    pub fn new(store: Arc<dyn MissionStore>) -> Self {
        Self { store }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &Arc<dyn MissionStore> {
        &self.store
    }

    /// Ingest one gridded mission dataset.
    ///
    /// A complete mission is never overwritten by near-real-time data: that
    /// case returns the stored mission unchanged with [`IngestOutcome::Blocked`].
    pub async fn ingest<D: GliderDataset + ?Sized>(
        &self,
        dataset: &D,
        options: IngestOptions,
    ) -> Result<IngestionResult> {
        let key = mission_key(dataset)?;
        let existing = self.store.find_mission(key).await?;

        if let Some(old) = &existing {
            if old.is_complete && !options.mission_complete {
                warn!(
                    mission = %key,
                    "Attempted overwrite of complete mission with NRT data. Blocked"
                );
                return Ok(IngestionResult {
                    mission: old.clone(),
                    outcome: IngestOutcome::Blocked,
                });
            }
        }

        let (mission, profiles) = build_mission(dataset, options)?;

        if existing.is_some() {
            info!(mission = %key, "Replacing mission and its profiles");
        }
        info!(mission = %key, profiles = profiles.len(), "Add profiles");

        let mission = self.store.replace_mission(mission, profiles).await?;

        info!(
            mission = %key,
            complete = mission.is_complete,
            total_profiles = mission.total_profiles,
            total_distance_m = mission.total_distance_m,
            "Add mission"
        );

        let outcome = if existing.is_some() {
            IngestOutcome::Replaced
        } else {
            IngestOutcome::Created
        };
        Ok(IngestionResult { mission, outcome })
    }
}

/// Build the mission record and its profiles without touching storage.
pub fn build_mission<D: GliderDataset + ?Sized>(
    dataset: &D,
    options: IngestOptions,
) -> Result<(GliderMission, Vec<Profile>)> {
    let header = mission_header(dataset)?;
    let key = header.key;

    let profile_indices = dataset.profile_index()?;
    let lons = dataset.longitude()?;
    let lats = dataset.latitude()?;
    let times = dataset.time_ns()?;
    let max_depths = max_depth_per_profile(&dataset.depth()?, &dataset.pressure()?)?;

    let count = profile_indices.len();
    for (name, len) in [
        ("longitude", lons.len()),
        ("latitude", lats.len()),
        ("time", times.len()),
        ("pressure", max_depths.len()),
    ] {
        if len != count {
            return Err(IngestionError::InconsistentDataset(format!(
                "{} has {} values but there are {} profiles",
                name, len, count
            )));
        }
    }

    let (first, last) = match (times.first(), times.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(IngestionError::MissingMetadata(format!(
                "{} has no profiles",
                key
            )))
        }
    };

    let profiles = build_profiles(key, &lons, &lats, &times, &max_depths);
    let summed_depth: f64 = max_depths.iter().flatten().sum();
    let (total_profiles, total_depth) =
        profile_totals(count, summed_depth, options.total_profiles);

    let mission = GliderMission {
        glider: key.glider,
        mission: key.mission,
        bbox: header.bbox,
        start: nanos_to_datetime(first),
        end: nanos_to_datetime(last),
        sea_name: header.sea_name,
        project: header.project,
        project_url: header.project_url,
        wmo_id: header.wmo_id,
        variables: present_variables(&dataset.variable_names()),
        profile_indices,
        profile_ids: Vec::new(),
        total_profiles,
        total_distance_m: total_distance(&profiles),
        total_depth,
        is_complete: options.mission_complete,
    };

    Ok((mission, profiles))
}

fn build_profiles(
    key: MissionKey,
    lons: &[f64],
    lats: &[f64],
    times: &[i64],
    max_depths: &[Option<f64>],
) -> Vec<Profile> {
    (0..lons.len())
        .map(|i| Profile {
            id: Uuid::new_v4(),
            glider: key.glider,
            mission: key.mission,
            number: i as i64,
            lon: lons[i],
            lat: lats[i],
            time: nanos_to_datetime(times[i]),
            max_depth: max_depths[i],
        })
        .collect()
}

/// Total profile count and total depth for a mission.
///
/// With an expected count the summed depth is extrapolated by
/// `expected / last_index`, where `last_index` is one less than the number of
/// profiles present. A single-profile dataset scales by the expected count.
pub fn profile_totals(count: usize, summed_depth: f64, expected: Option<i64>) -> (i64, f64) {
    match expected {
        Some(expected) if expected > 0 => {
            let last_index = count.saturating_sub(1).max(1) as f64;
            (expected, summed_depth * (expected as f64 / last_index))
        }
        _ => (count as i64, summed_depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_profile_totals_without_expected_count() {
        assert_eq!(profile_totals(10, 500.0, None), (10, 500.0));
    }

    #[test]
    fn test_profile_totals_extrapolates_by_last_index() {
        let (total, depth) = profile_totals(10, 900.0, Some(20));
        assert_eq!(total, 20);
        assert_approx_eq!(depth, 900.0 * 20.0 / 9.0, 1e-9);
    }

    #[test]
    fn test_profile_totals_zero_expected_is_ignored() {
        assert_eq!(profile_totals(4, 100.0, Some(0)), (4, 100.0));
    }

    #[test]
    fn test_profile_totals_single_profile() {
        let (total, depth) = profile_totals(1, 50.0, Some(8));
        assert_eq!(total, 8);
        assert_approx_eq!(depth, 400.0, 1e-9);
    }
}
