//! Synthetic glider mission datasets.
//!
//! Profiles follow a predictable pattern so tests can compute expected
//! distances and depths by hand:
//!
//! - profile `t` sits at `lon = 17.0 + 0.01 t`, `lat = 57.0`
//! - profile `t` is `MISSION_START_NS + t * PROFILE_INTERVAL_NS`
//! - the depth axis is `10, 20, ..., 10 * DEPTH_BINS` meters and profile `t`
//!   has valid pressure down to [`synthetic_max_depth`]`(t)`

use gridfile::{MemoryDataset, PressureGrid};

use crate::fixtures::{mission_attributes, MISSION_START_NS, PROFILE_INTERVAL_NS};

/// Number of bins on the synthetic depth axis.
pub const DEPTH_BINS: usize = 10;

/// Longitude step between consecutive synthetic profiles.
pub const LON_STEP: f64 = 0.01;

/// Latitude of every synthetic profile.
pub const TRACK_LATITUDE: f64 = 57.0;

/// Sensor variables carried by synthetic missions besides the coordinates.
pub const SENSOR_VARIABLES: [&str; 5] = [
    "temperature",
    "salinity",
    "chlorophyll",
    "oxygen_concentration",
    "ad2cp_heading",
];

/// Synthetic depth axis in meters.
pub fn depth_axis() -> Vec<f64> {
    (1..=DEPTH_BINS).map(|i| 10.0 * i as f64).collect()
}

/// Deepest valid depth of synthetic profile `t`.
pub fn synthetic_max_depth(t: usize) -> f64 {
    10.0 * ((t % DEPTH_BINS) + 1) as f64
}

/// Sum of [`synthetic_max_depth`] over the first `n_profiles` profiles.
pub fn synthetic_depth_sum(n_profiles: usize) -> f64 {
    (0..n_profiles).map(synthetic_max_depth).sum()
}

/// Depth-major pressure grid with NaN below each profile's deepest bin.
///
/// A valid cell holds roughly the pressure in dbar at that depth.
pub fn pressure_grid(n_profiles: usize) -> PressureGrid {
    let depths = depth_axis();
    let mut values = Vec::with_capacity(DEPTH_BINS * n_profiles);
    for (d, depth) in depths.iter().enumerate() {
        for t in 0..n_profiles {
            if d <= t % DEPTH_BINS {
                values.push(depth * 1.01);
            } else {
                values.push(f64::NAN);
            }
        }
    }
    PressureGrid {
        n_depth: DEPTH_BINS,
        n_time: n_profiles,
        values,
    }
}

/// Complete synthetic mission dataset with every attribute and variable
/// the ingestion transform reads.
///
/// # Example
///
/// ```
/// use gridfile::GliderDataset;
/// use test_utils::synthetic_mission;
///
/// let ds = synthetic_mission(63, 44, 4);
/// assert_eq!(ds.i64_attribute("glider_serial").unwrap(), 63);
/// assert_eq!(ds.profile_index().unwrap(), vec![0, 1, 2, 3]);
/// ```
pub fn synthetic_mission(glider: i64, mission: i64, n_profiles: usize) -> MemoryDataset {
    let mut dataset = MemoryDataset::new();
    for (name, value) in mission_attributes(glider, mission) {
        dataset = dataset.with_attribute(name, value);
    }
    for name in SENSOR_VARIABLES {
        dataset = dataset.with_variable(name);
    }

    let longitude = (0..n_profiles)
        .map(|t| 17.0 + LON_STEP * t as f64)
        .collect();
    let latitude = vec![TRACK_LATITUDE; n_profiles];
    let time_ns = (0..n_profiles)
        .map(|t| MISSION_START_NS + t as i64 * PROFILE_INTERVAL_NS)
        .collect();

    dataset
        .with_profile_index((0..n_profiles as i64).collect())
        .with_positions(longitude, latitude)
        .with_time_ns(time_ns)
        .with_depth(depth_axis())
        .with_pressure(pressure_grid(n_profiles))
}

/// Synthetic mission whose track follows the given `(lon, lat)` points.
pub fn mission_along_track(glider: i64, mission: i64, track: &[(f64, f64)]) -> MemoryDataset {
    let mut dataset = synthetic_mission(glider, mission, track.len());
    dataset.longitude = Some(track.iter().map(|&(lon, _)| lon).collect());
    dataset.latitude = Some(track.iter().map(|&(_, lat)| lat).collect());
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridfile::GliderDataset;

    #[test]
    fn test_depth_axis() {
        let axis = depth_axis();
        assert_eq!(axis.len(), DEPTH_BINS);
        assert_eq!(axis[0], 10.0);
        assert_eq!(axis[DEPTH_BINS - 1], 100.0);
    }

    #[test]
    fn test_pressure_grid_masks_below_max_depth() {
        let grid = pressure_grid(3);
        assert!(grid.is_valid(0, 0));
        assert!(!grid.is_valid(1, 0));
        assert!(grid.is_valid(2, 2));
        assert!(!grid.is_valid(3, 2));
    }

    #[test]
    fn test_depth_sum() {
        assert_eq!(synthetic_depth_sum(4), 10.0 + 20.0 + 30.0 + 40.0);
        // wraps after DEPTH_BINS profiles
        assert_eq!(synthetic_max_depth(DEPTH_BINS), 10.0);
    }

    #[test]
    fn test_synthetic_mission_arrays_align() {
        let ds = synthetic_mission(63, 44, 7);
        assert_eq!(ds.longitude().unwrap().len(), 7);
        assert_eq!(ds.latitude().unwrap().len(), 7);
        assert_eq!(ds.time_ns().unwrap().len(), 7);
        assert_eq!(ds.pressure().unwrap().n_time, 7);
        assert!(ds.variable_names().contains(&"chlorophyll".to_string()));
    }

    #[test]
    fn test_mission_along_track() {
        let ds = mission_along_track(1, 2, &[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(ds.longitude().unwrap(), vec![0.0, 1.0]);
        assert_eq!(ds.latitude().unwrap(), vec![0.0, 0.0]);
    }
}
