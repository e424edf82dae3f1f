//! Mission commands
//!
//! A [`Command`] is one mission item in the on-board representation:
//! fixed-point position plus four command-specific parameters. Which fields
//! a command uses depends on its id; see [`super::remap`].

use crate::geo;
use bitflags::bitflags;

pub const MAV_CMD_NAV_WAYPOINT: u16 = 16;
pub const MAV_CMD_NAV_LOITER_UNLIM: u16 = 17;
pub const MAV_CMD_NAV_LOITER_TURNS: u16 = 18;
pub const MAV_CMD_NAV_LOITER_TIME: u16 = 19;
pub const MAV_CMD_NAV_RETURN_TO_LAUNCH: u16 = 20;
pub const MAV_CMD_NAV_LAND: u16 = 21;
pub const MAV_CMD_NAV_TAKEOFF: u16 = 22;

/// Command ids below this value are navigation commands and carry a position
pub const MAV_CMD_NAV_LAST: u16 = 95;

pub const MAV_CMD_CONDITION_DELAY: u16 = 112;
pub const MAV_CMD_CONDITION_CHANGE_ALT: u16 = 113;
pub const MAV_CMD_CONDITION_DISTANCE: u16 = 114;
pub const MAV_CMD_DO_SET_MODE: u16 = 176;
pub const MAV_CMD_DO_JUMP: u16 = 177;
pub const MAV_CMD_DO_CHANGE_SPEED: u16 = 178;
pub const MAV_CMD_DO_SET_HOME: u16 = 179;
pub const MAV_CMD_DO_SET_PARAMETER: u16 = 180;
pub const MAV_CMD_DO_SET_RELAY: u16 = 181;
pub const MAV_CMD_DO_REPEAT_RELAY: u16 = 182;
pub const MAV_CMD_DO_SET_SERVO: u16 = 183;
pub const MAV_CMD_DO_REPEAT_SERVO: u16 = 184;

/// Check if a command carries a geographic position
pub fn cmd_has_location(command_id: u16) -> bool {
    command_id < MAV_CMD_NAV_LAST
}

bitflags! {
    /// Command option bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CommandOptions: u8 {
        /// Altitude was given relative to home; `alt` still holds the absolute value
        const RELATIVE_ALT = 0b00000001;
    }
}

/// Mission command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Command {
    /// MAV_CMD id
    pub id: u16,
    pub options: CommandOptions,
    pub p1: f32,
    pub p2: f32,
    pub p3: f32,
    pub p4: f32,
    /// Latitude, degrees * 1e7
    pub lat: i32,
    /// Longitude, degrees * 1e7
    pub lng: i32,
    /// Absolute altitude, centimetres
    pub alt: i32,
}

impl Command {
    /// Waypoint at a fixed-point position with an acceptance radius (m)
    pub fn waypoint(lat: i32, lng: i32, alt_cm: i32, radius: f32) -> Self {
        Self {
            id: MAV_CMD_NAV_WAYPOINT,
            p2: radius,
            lat,
            lng,
            alt: alt_cm,
            ..Self::default()
        }
    }

    /// Acceptance radius (m); NAV_WAYPOINT keeps it in `p2`
    pub fn radius(&self) -> f32 {
        self.p2
    }

    pub fn lat_rad(&self) -> f64 {
        geo::deg_int_to_rad(self.lat)
    }

    pub fn lng_rad(&self) -> f64 {
        geo::deg_int_to_rad(self.lng)
    }

    /// Altitude in metres
    pub fn alt_m(&self) -> f32 {
        self.alt as f32 / 100.0
    }

    /// Distance (m) from this command's position to a fixed-point position
    pub fn distance_to(&self, lat: i32, lng: i32) -> f32 {
        geo::distance(
            self.lat_rad(),
            self.lng_rad(),
            geo::deg_int_to_rad(lat),
            geo::deg_int_to_rad(lng),
        ) as f32
    }

    /// Bearing (rad) from this command's position to a fixed-point position
    pub fn bearing_to(&self, lat: i32, lng: i32) -> f32 {
        geo::bearing(
            self.lat_rad(),
            self.lng_rad(),
            geo::deg_int_to_rad(lat),
            geo::deg_int_to_rad(lng),
        ) as f32
    }

    /// Bearing (rad) from this command to another
    pub fn bearing_to_command(&self, other: &Command) -> f32 {
        self.bearing_to(other.lat, other.lng)
    }

    /// North/east/down metres of a fixed-point position relative to this command
    pub fn ned_of(&self, lat: i32, lng: i32, alt_cm: i32) -> (f32, f32, f32) {
        let (north, east) = geo::ned_from(
            self.lat_rad(),
            self.lng_rad(),
            geo::deg_int_to_rad(lat),
            geo::deg_int_to_rad(lng),
        );
        let down = (self.alt - alt_cm) as f32 / 100.0;
        (north as f32, east as f32, down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_has_location() {
        assert!(cmd_has_location(MAV_CMD_NAV_WAYPOINT));
        assert!(cmd_has_location(MAV_CMD_NAV_TAKEOFF));
        assert!(!cmd_has_location(MAV_CMD_NAV_LAST));
        assert!(!cmd_has_location(MAV_CMD_DO_CHANGE_SPEED));
    }

    #[test]
    fn test_waypoint_radius_in_p2() {
        let cmd = Command::waypoint(0, 0, 1000, 4.5);
        assert_eq!(cmd.id, MAV_CMD_NAV_WAYPOINT);
        assert_eq!(cmd.radius(), 4.5);
        assert_eq!(cmd.alt_m(), 10.0);
    }

    #[test]
    fn test_distance_and_bearing_north() {
        let home = Command::waypoint(473_977_000, 85_455_000, 0, 2.0);
        // 0.001 deg north is about 111 m
        let d = home.distance_to(473_987_000, 85_455_000);
        assert!((d - 111.19).abs() < 0.1);
        assert!(home.bearing_to(473_987_000, 85_455_000).abs() < 1e-4);
    }

    #[test]
    fn test_ned_of_point_east_and_below() {
        let home = Command::waypoint(0, 0, 5000, 2.0);
        let (n, e, d) = home.ned_of(0, 10_000, 3000);
        assert!(n.abs() < 1e-3);
        assert!((e - 111.19).abs() < 0.1);
        assert!((d - 20.0).abs() < 1e-4);
    }
}
