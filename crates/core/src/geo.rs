//! Spherical-earth geometry
//!
//! Positions are carried as fixed-point degrees (`deg * 1e7`) and converted
//! to radians here. All math runs in `f64` so metre-level differences
//! survive at large latitudes and longitudes.

use core::f64::consts::PI;

/// Mean earth radius used by every distance and frame conversion (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Fixed-point degree scale
pub const DEG_INT_SCALE: f64 = 1.0e7;

/// Fixed-point degrees to radians
pub fn deg_int_to_rad(value: i32) -> f64 {
    value as f64 / DEG_INT_SCALE * PI / 180.0
}

/// Radians to fixed-point degrees, rounded
pub fn rad_to_deg_int(value: f64) -> i32 {
    libm::round(value * 180.0 / PI * DEG_INT_SCALE) as i32
}

/// Great-circle distance between two points (radians in, metres out)
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = libm::sin(dlat / 2.0) * libm::sin(dlat / 2.0)
        + libm::cos(lat1) * libm::cos(lat2) * libm::sin(dlon / 2.0) * libm::sin(dlon / 2.0);
    2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a)) * EARTH_RADIUS_M
}

/// Initial great-circle bearing from point 1 to point 2 (radians, clockwise from north)
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlon = lon2 - lon1;
    let y = libm::sin(dlon) * libm::cos(lat2);
    let x = libm::cos(lat1) * libm::sin(lat2) - libm::sin(lat1) * libm::cos(lat2) * libm::cos(dlon);
    libm::atan2(y, x)
}

/// Signed cross-track distance (m).
///
/// `d` is the distance from the leg start to the vehicle, `bearing_current`
/// the bearing from the leg start to the vehicle and `bearing_next` the leg
/// bearing. Positive when the vehicle is right of the leg.
pub fn cross_track(d: f64, bearing_current: f64, bearing_next: f64) -> f64 {
    libm::asin(libm::sin(d / EARTH_RADIUS_M) * libm::sin(bearing_current - bearing_next))
        * EARTH_RADIUS_M
}

/// Along-track distance (m) travelled from the leg start
pub fn along_track(d: f64, cross_track: f64) -> f64 {
    let ratio = libm::cos(d / EARTH_RADIUS_M) / libm::cos(cross_track / EARTH_RADIUS_M);
    libm::acos(ratio.clamp(-1.0, 1.0)) * EARTH_RADIUS_M
}

/// Offset a point by north/east metres (flat-earth approximation)
pub fn offset_ned(lat: f64, lon: f64, north: f64, east: f64) -> (f64, f64) {
    let lat_out = lat + north / EARTH_RADIUS_M;
    let lon_out = lon + east / (EARTH_RADIUS_M * libm::cos(lat));
    (lat_out, lon_out)
}

/// North/east metres of a point relative to an origin (flat-earth approximation)
pub fn ned_from(origin_lat: f64, origin_lon: f64, lat: f64, lon: f64) -> (f64, f64) {
    let north = (lat - origin_lat) * EARTH_RADIUS_M;
    let east = (lon - origin_lon) * EARTH_RADIUS_M * libm::cos(origin_lat);
    (north, east)
}

/// Wrap an angle into `[-pi, pi]`
pub fn wrap_pi(angle: f32) -> f32 {
    let two_pi = 2.0 * core::f32::consts::PI;
    let mut wrapped = libm::fmodf(angle, two_pi);
    if wrapped > core::f32::consts::PI {
        wrapped -= two_pi;
    } else if wrapped < -core::f32::consts::PI {
        wrapped += two_pi;
    }
    wrapped
}
