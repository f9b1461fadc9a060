//! Common test fixtures for glider mission tests.
//!
//! Global attribute sets as written by pyglider, plus a few reference
//! instants and regions.

use gridfile::AttributeValue;

/// Global attribute names every gridfile must carry.
pub mod attr_names {
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

    pub const ALL: [&str; 10] = [
        GLIDER_SERIAL,
        DEPLOYMENT_ID,
        LON_MIN,
        LON_MAX,
        LAT_MIN,
        LAT_MAX,
        SEA_NAME,
        PROJECT,
        PROJECT_URL,
        WMO_ID,
    ];
}

/// Reference regions as `(lon_min, lon_max, lat_min, lat_max)`.
pub mod region {
    /// Eastern Gotland basin
    pub const GOTLAND: (f64, f64, f64, f64) = (17.0, 20.5, 56.5, 58.5);

    /// Skagerrak off the Swedish west coast
    pub const SKAGERRAK: (f64, f64, f64, f64) = (10.0, 11.5, 57.8, 58.6);
}

/// 2023-05-01T00:00:00Z in nanoseconds since the Unix epoch.
pub const MISSION_START_NS: i64 = 1_682_899_200 * 1_000_000_000;

/// Three hours in nanoseconds.
pub const PROFILE_INTERVAL_NS: i64 = 3 * 3_600 * 1_000_000_000;

pub const SEA_NAME: &str = "Baltic";
pub const PROJECT: &str = "SAMBA";
pub const PROJECT_URL: &str = "https://voiceoftheocean.org/samba-smart-autonomous-monitoring-of-the-baltic-sea/";
pub const WMO_ID: i64 = 6_801_573;

/// Full global attribute set for a mission inside [`region::GOTLAND`].
///
/// Serial and deployment are stored as numeric text, the way pyglider
/// writes them.
pub fn mission_attributes(glider: i64, mission: i64) -> Vec<(&'static str, AttributeValue)> {
    let (lon_min, lon_max, lat_min, lat_max) = region::GOTLAND;
    vec![
        (attr_names::GLIDER_SERIAL, AttributeValue::from(glider.to_string())),
        (attr_names::DEPLOYMENT_ID, AttributeValue::from(format!("{:04}", mission))),
        (attr_names::LON_MIN, AttributeValue::from(lon_min)),
        (attr_names::LON_MAX, AttributeValue::from(lon_max)),
        (attr_names::LAT_MIN, AttributeValue::from(lat_min)),
        (attr_names::LAT_MAX, AttributeValue::from(lat_max)),
        (attr_names::SEA_NAME, AttributeValue::from(SEA_NAME)),
        (attr_names::PROJECT, AttributeValue::from(PROJECT)),
        (attr_names::PROJECT_URL, AttributeValue::from(PROJECT_URL)),
        (attr_names::WMO_ID, AttributeValue::from(WMO_ID)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_cover_all_names() {
        let attrs = mission_attributes(63, 44);
        let names: Vec<_> = attrs.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, attr_names::ALL.to_vec());
    }

    #[test]
    fn test_deployment_is_zero_padded_text() {
        let attrs = mission_attributes(63, 44);
        let (_, deployment) = &attrs[1];
        assert_eq!(deployment.as_text(), "0044");
        assert_eq!(deployment.as_i64(), Some(44));
    }
}
