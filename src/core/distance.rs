use crate::models::{BoundingBox, Position};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance between two points in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two positions in kilometers
#[inline]
pub fn distance_between(a: &Position, b: &Position) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Whether `point` lies within `radius_km` of `center`, boundary inclusive
#[inline]
pub fn within_radius(center: &Position, point: &Position, radius_km: f64) -> bool {
    distance_between(center, point) <= radius_km
}

/// Calculate a bounding box around a center point
///
/// Much cheaper than haversine, used only as a pre-filter: candidates inside
/// the box still go through the exact radius check. 1° latitude ≈ 111km,
/// 1° longitude ≈ 111km * cos(latitude).
///
/// Latitude is clamped to the poles, but the longitude window is NOT clamped
/// to [-180, 180]: near the antimeridian `min_lon`/`max_lon` extend past it
/// and consumers must treat the window modulo 360. Clamping here would
/// truncate the window and drop in-radius points on the far side.
pub fn calculate_bounding_box(center: &Position, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;

    // Longitude degrees shrink toward the poles; cos can approach zero there,
    // so cap the delta at a full hemisphere instead of letting it blow up.
    let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
    let lon_delta = (radius_km / (111.0 * cos_lat)).min(180.0);

    BoundingBox {
        min_lat: (center.latitude - lat_delta).max(-90.0),
        max_lat: (center.latitude + lat_delta).min(90.0),
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

/// Check if a point is within a bounding box, treating longitude modulo 360
#[inline]
pub fn is_within_bounding_box(position: &Position, bbox: &BoundingBox) -> bool {
    if position.latitude < bbox.min_lat || position.latitude > bbox.max_lat {
        return false;
    }
    if bbox.max_lon - bbox.min_lon >= 360.0 {
        return true;
    }
    let lon = position.longitude;
    [lon, lon - 360.0, lon + 360.0]
        .iter()
        .any(|l| *l >= bbox.min_lon && *l <= bbox.max_lon)
}
