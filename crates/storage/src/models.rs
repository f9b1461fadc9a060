//! Stored record types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a glider deployment: glider serial number + deployment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissionKey {
    pub glider: i64,
    pub mission: i64,
}

impl MissionKey {
    pub fn new(glider: i64, mission: i64) -> Self {
        Self { glider, mission }
    }
}

impl fmt::Display for MissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SEA{} M{}", self.glider, self.mission)
    }
}

/// Geographic extent of a mission in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }
}

/// Summary record for one glider deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GliderMission {
    pub glider: i64,
    pub mission: i64,
    pub bbox: BoundingBox,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sea_name: String,
    pub project: String,
    pub project_url: String,
    pub wmo_id: String,
    /// Display names of the sensor variables present in the mission
    pub variables: Vec<String>,
    /// Raw profile index values as found in the gridfile
    pub profile_indices: Vec<i64>,
    /// Profile record ids ordered by profile number
    pub profile_ids: Vec<Uuid>,
    pub total_profiles: i64,
    pub total_distance_m: f64,
    pub total_depth: f64,
    pub is_complete: bool,
}

impl GliderMission {
    pub fn key(&self) -> MissionKey {
        MissionKey::new(self.glider, self.mission)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Summary of one dive or climb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub glider: i64,
    pub mission: i64,
    /// Zero-based profile number within the mission
    pub number: i64,
    pub lon: f64,
    pub lat: f64,
    pub time: DateTime<Utc>,
    /// Deepest depth bin with a valid pressure reading
    pub max_depth: Option<f64>,
}

impl Profile {
    pub fn key(&self) -> MissionKey {
        MissionKey::new(self.glider, self.mission)
    }
}

/// A named scalar statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: f64,
}

/// Records whether a mission went through the yml-configured pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMission {
    pub glider: i64,
    pub mission: i64,
    pub yml: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_key_display() {
        assert_eq!(MissionKey::new(63, 44).to_string(), "SEA63 M44");
    }

    #[test]
    fn test_mission_key_ordering() {
        let mut keys = vec![
            MissionKey::new(66, 1),
            MissionKey::new(63, 45),
            MissionKey::new(63, 44),
        ];
        keys.sort();
        assert_eq!(keys[0], MissionKey::new(63, 44));
        assert_eq!(keys[2], MissionKey::new(66, 1));
    }
}
