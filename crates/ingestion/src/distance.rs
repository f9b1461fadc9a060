//! Distance accumulation along a mission track.
//!
//! Legs between consecutive profiles span at most a few kilometers, so a flat
//! local approximation is used instead of a great-circle formula.

use storage::Profile;

/// Meters per degree used by the planar approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Planar distance in meters for one leg.
///
/// `lat` is the reference latitude in degrees. The cosine term scales the
/// latitude difference.
pub fn leg_distance_m(dlon: f64, dlat: f64, lat: f64) -> f64 {
    let dy = dlon * METERS_PER_DEGREE;
    let dx = dlat * METERS_PER_DEGREE * lat.to_radians().cos();
    (dx * dx + dy * dy).sqrt()
}

/// Sum of leg distances over `(lon, lat)` points in track order.
///
/// Each leg uses the latitude of its starting point as reference.
pub fn track_distance_m<I>(points: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut previous: Option<(f64, f64)> = None;
    let mut distance = 0.0;
    for (lon, lat) in points {
        if let Some((prev_lon, prev_lat)) = previous {
            distance += leg_distance_m(lon - prev_lon, lat - prev_lat, prev_lat);
        }
        previous = Some((lon, lat));
    }
    distance
}

/// Total distance traveled over profiles already ordered by number.
pub fn total_distance(profiles: &[Profile]) -> f64 {
    track_distance_m(profiles.iter().map(|p| (p.lon, p.lat)))
}
