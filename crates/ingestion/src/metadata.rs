//! Metadata extraction from gridded glider datasets.
//!
//! Reads global attributes into a mission header and reduces the pressure
//! grid to one maximum depth per profile.

use gridfile::{GliderDataset, PressureGrid};
use storage::{BoundingBox, MissionKey};

use crate::error::{IngestionError, Result};

/// Global attribute names read from a gridfile.
pub mod attrs {
    pub const GLIDER_SERIAL: &str = "glider_serial";
    pub const DEPLOYMENT_ID: &str = "deployment_id";
    pub const LON_MIN: &str = "geospatial_lon_min";
    pub const LON_MAX: &str = "geospatial_lon_max";
    pub const LAT_MIN: &str = "geospatial_lat_min";
    pub const LAT_MAX: &str = "geospatial_lat_max";
    pub const SEA_NAME: &str = "sea_name";
    pub const PROJECT: &str = "project";
    pub const PROJECT_URL: &str = "project_url";
    pub const WMO_ID: &str = "wmo_id";
}

/// Mission-level fields taken straight from global attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionHeader {
    pub key: MissionKey,
    pub bbox: BoundingBox,
    pub sea_name: String,
    pub project: String,
    pub project_url: String,
    pub wmo_id: String,
}

/// Read the (glider, mission) identity.
pub fn mission_key<D: GliderDataset + ?Sized>(dataset: &D) -> Result<MissionKey> {
    let glider = dataset.i64_attribute(attrs::GLIDER_SERIAL)?;
    let mission = dataset.i64_attribute(attrs::DEPLOYMENT_ID)?;
    Ok(MissionKey::new(glider, mission))
}

/// Read every mission-level attribute. Any missing attribute is an error.
pub fn mission_header<D: GliderDataset + ?Sized>(dataset: &D) -> Result<MissionHeader> {
    Ok(MissionHeader {
        key: mission_key(dataset)?,
        bbox: BoundingBox::new(
            dataset.f64_attribute(attrs::LON_MIN)?,
            dataset.f64_attribute(attrs::LON_MAX)?,
            dataset.f64_attribute(attrs::LAT_MIN)?,
            dataset.f64_attribute(attrs::LAT_MAX)?,
        ),
        sea_name: dataset.text_attribute(attrs::SEA_NAME)?,
        project: dataset.text_attribute(attrs::PROJECT)?,
        project_url: dataset.text_attribute(attrs::PROJECT_URL)?,
        wmo_id: dataset.text_attribute(attrs::WMO_ID)?,
    })
}

/// Deepest depth bin per profile among cells with a valid pressure reading.
///
/// The depth axis is broadcast across all profiles, cells without pressure are
/// masked, and the maximum is taken per profile. A profile with no valid cell
/// yields `None`.
pub fn max_depth_per_profile(depth: &[f64], pressure: &PressureGrid) -> Result<Vec<Option<f64>>> {
    if depth.len() != pressure.n_depth {
        return Err(IngestionError::InconsistentDataset(format!(
            "depth axis has {} bins but pressure has {}",
            depth.len(),
            pressure.n_depth
        )));
    }

    let max_depths = (0..pressure.n_time)
        .map(|t| {
            depth
                .iter()
                .enumerate()
                .filter(|&(d, value)| pressure.is_valid(d, t) && value.is_finite())
                .map(|(_, &value)| value)
                .fold(None, |acc: Option<f64>, value| {
                    Some(acc.map_or(value, |m| m.max(value)))
                })
        })
        .collect();

    Ok(max_depths)
}
