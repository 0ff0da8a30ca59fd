//! Distance and sampling helpers
//!
//! Interpolation is plain linear interpolation of latitude/longitude.

use haversine::{Location as HaversineLocation, Units, distance as haversine_distance};

use crate::models::Coordinates;

const KM_PER_DEGREE_LATITUDE: f64 = 111.32;

/// Great-circle distance in km (haversine, earth radius 6371 km)
#[must_use]
pub fn distance(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(
        HaversineLocation {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        HaversineLocation {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        Units::Kilometers,
    )
}

/// Total length in km of a polyline
#[must_use]
pub fn path_length(path: &[Coordinates]) -> f64 {
    path.windows(2).map(|leg| distance(&leg[0], &leg[1])).sum()
}

fn lerp(from: &Coordinates, to: &Coordinates, t: f64) -> Coordinates {
    Coordinates::new(
        from.latitude + (to.latitude - from.latitude) * t,
        from.longitude + (to.longitude - from.longitude) * t,
    )
}

/// Split `path` into `segment_count` evenly spaced intervals, returning the
/// `segment_count + 1` boundary points from start to end.
///
/// Spacing follows cumulative distance along the polyline; within a leg the
/// point is a linear blend of the leg's endpoints. An empty path yields no
/// points, a single point or zero-length path repeats its first point.
#[must_use]
pub fn interpolate(path: &[Coordinates], segment_count: usize) -> Vec<Coordinates> {
    let Some(first) = path.first() else {
        return Vec::new();
    };
    if segment_count == 0 {
        return vec![*first];
    }

    let leg_lengths: Vec<f64> = path.windows(2).map(|leg| distance(&leg[0], &leg[1])).collect();
    let total: f64 = leg_lengths.iter().sum();
    if path.len() == 1 || total <= 0.0 || !total.is_finite() {
        return vec![*first; segment_count + 1];
    }

    let mut points = Vec::with_capacity(segment_count + 1);
    let mut leg = 0;
    let mut walked = 0.0;
    for i in 0..=segment_count {
        let target = total * i as f64 / segment_count as f64;
        while leg < leg_lengths.len() - 1 && walked + leg_lengths[leg] < target {
            walked += leg_lengths[leg];
            leg += 1;
        }
        let t = if leg_lengths[leg] > 0.0 {
            ((target - walked) / leg_lengths[leg]).clamp(0.0, 1.0)
        } else {
            0.0
        };
        points.push(lerp(&path[leg], &path[leg + 1], t));
    }
    points
}

/// `count` evenly spaced sample points between two waypoints, endpoints
/// included. A single sample sits at the midpoint.
#[must_use]
pub fn sample_between(from: &Coordinates, to: &Coordinates, count: usize) -> Vec<Coordinates> {
    match count {
        0 => Vec::new(),
        1 => vec![lerp(from, to, 0.5)],
        _ => (0..count)
            .map(|i| lerp(from, to, i as f64 / (count - 1) as f64))
            .collect(),
    }
}

/// Move a point `km` along a compass bearing (degrees) using a local flat-earth
/// approximation.
#[must_use]
pub fn offset(point: &Coordinates, km: f64, bearing_degrees: f64) -> Coordinates {
    let bearing = bearing_degrees.to_radians();
    let cos_lat = point.latitude.to_radians().cos().abs().max(1e-6);
    let latitude = point.latitude + km * bearing.cos() / KM_PER_DEGREE_LATITUDE;
    let longitude = point.longitude + km * bearing.sin() / (KM_PER_DEGREE_LATITUDE * cos_lat);
    Coordinates::new(latitude.clamp(-90.0, 90.0), wrap_longitude(longitude))
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}
