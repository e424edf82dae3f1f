//! Navigation type definitions
//!
//! - `NavState`: snapshot of attitude, rates, speed and position
//! - `Setpoint`: guidance targets handed from the guide to the controller

use crate::geo;
use crate::mission::Command;

/// Navigation state snapshot
///
/// Position is kept in fixed point (degrees * 1e7, millimetres) so repeated
/// conversions and persistence never drift. Accessors convert to radians
/// and metres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavState {
    /// Time of the last update (us)
    pub timestamp_us: u64,
    /// Attitude (rad)
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    /// Body rates (rad/s)
    pub roll_rate: f32,
    pub pitch_rate: f32,
    pub yaw_rate: f32,
    /// Speeds (m/s)
    pub air_speed: f32,
    pub ground_speed: f32,
    /// Course over ground (rad)
    pub heading: f32,
    /// Latitude, degrees * 1e7
    pub lat: i32,
    /// Longitude, degrees * 1e7
    pub lon: i32,
    /// Altitude, millimetres
    pub alt_mm: i32,
    /// Down velocity (m/s)
    pub v_d: f32,
}

impl NavState {
    pub fn lat_rad(&self) -> f64 {
        geo::deg_int_to_rad(self.lat)
    }

    pub fn lon_rad(&self) -> f64 {
        geo::deg_int_to_rad(self.lon)
    }

    pub fn alt_m(&self) -> f32 {
        self.alt_mm as f32 / 1000.0
    }

    pub fn set_lat_rad(&mut self, lat: f64) {
        self.lat = geo::rad_to_deg_int(lat);
    }

    pub fn set_lon_rad(&mut self, lon: f64) {
        self.lon = geo::rad_to_deg_int(lon);
    }

    pub fn set_alt_m(&mut self, alt: f32) {
        self.alt_mm = libm::roundf(alt * 1000.0) as i32;
    }

    /// North velocity derived from course and ground speed
    pub fn v_n(&self) -> f32 {
        libm::cosf(self.heading) * self.ground_speed
    }

    /// East velocity derived from course and ground speed
    pub fn v_e(&self) -> f32 {
        libm::sinf(self.heading) * self.ground_speed
    }

    /// Altitude in centimetres, the mission command unit
    pub fn alt_cm(&self) -> i32 {
        self.alt_mm / 10
    }

    /// North/east/down metres relative to `home`
    pub fn position_ned(&self, home: &Command) -> (f32, f32, f32) {
        home.ned_of(self.lat, self.lon, self.alt_cm())
    }
}

/// Guidance targets for one control cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Setpoint {
    /// Heading command (rad)
    pub heading: f32,
    /// Air speed command (m/s)
    pub air_speed: f32,
    /// Ground speed command (m/s)
    pub ground_speed: f32,
    /// Altitude command (m)
    pub altitude: f32,
    /// Target position relative to home (m)
    pub p_n: f32,
    pub p_e: f32,
    pub p_d: f32,
}
