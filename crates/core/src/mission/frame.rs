//! Reference-frame transforms between wire positions and [`Command`] fields
//!
//! Wire positions are `(x, y, z)` floats whose meaning depends on the frame:
//! degrees and metres for the global frames, north/east/down metres from
//! home for the local frame.

use super::command::{cmd_has_location, Command, CommandOptions};
use crate::geo;

/// Coordinate frame of a wire position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Absolute latitude, longitude and altitude
    Global,
    /// Absolute latitude and longitude, altitude relative to home
    GlobalRelativeAlt,
    /// North, east, down metres relative to home
    LocalNed,
}

/// Position as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WirePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Decode a wire position into `command`'s position fields and options
pub fn decode_position(command: &mut Command, frame: Frame, pos: WirePosition, home: &Command) {
    match frame {
        Frame::Global => {
            command.lat = degrees_to_int(pos.x);
            command.lng = degrees_to_int(pos.y);
            command.alt = metres_to_cm(pos.z);
            command.options = CommandOptions::empty();
        }
        Frame::GlobalRelativeAlt => {
            command.lat = degrees_to_int(pos.x);
            command.lng = degrees_to_int(pos.y);
            command.alt = metres_to_cm(pos.z).saturating_add(home.alt);
            command.options = CommandOptions::RELATIVE_ALT;
        }
        Frame::LocalNed => {
            let (lat, lng) = geo::offset_ned(
                home.lat_rad(),
                home.lng_rad(),
                pos.x as f64,
                pos.y as f64,
            );
            command.lat = geo::rad_to_deg_int(lat);
            command.lng = geo::rad_to_deg_int(lng);
            command.alt = home.alt.saturating_sub(metres_to_cm(pos.z));
            command.options = CommandOptions::RELATIVE_ALT;
        }
    }
}

/// Encode `command`'s position for download.
///
/// Relative-altitude commands go out in the relative-altitude frame, all
/// others as absolute global. Commands without a position send zeros.
pub fn encode_position(command: &Command, home: &Command) -> (Frame, WirePosition) {
    let relative = command.options.contains(CommandOptions::RELATIVE_ALT);
    let frame = if relative {
        Frame::GlobalRelativeAlt
    } else {
        Frame::Global
    };
    if !cmd_has_location(command.id) {
        return (frame, WirePosition::default());
    }
    let z = if relative {
        (command.alt - home.alt) as f32 / 100.0
    } else {
        command.alt as f32 / 100.0
    };
    let pos = WirePosition {
        x: (command.lat as f64 / geo::DEG_INT_SCALE) as f32,
        y: (command.lng as f64 / geo::DEG_INT_SCALE) as f32,
        z,
    };
    (frame, pos)
}

fn degrees_to_int(degrees: f32) -> i32 {
    libm::round(degrees as f64 * geo::DEG_INT_SCALE) as i32
}

fn metres_to_cm(metres: f32) -> i32 {
    libm::roundf(metres * 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::command::MAV_CMD_DO_JUMP;

    fn home() -> Command {
        Command::waypoint(473_977_000, 85_455_000, 48_800, 0.0)
    }

    #[test]
    fn test_decode_global() {
        let mut cmd = Command::default();
        let pos = WirePosition {
            x: 47.5,
            y: 8.25,
            z: 500.0,
        };
        decode_position(&mut cmd, Frame::Global, pos, &home());
        assert_eq!(cmd.lat, 475_000_000);
        assert_eq!(cmd.lng, 82_500_000);
        assert_eq!(cmd.alt, 50_000);
        assert!(cmd.options.is_empty());
    }

    #[test]
    fn test_decode_relative_alt_adds_home() {
        let mut cmd = Command::default();
        let pos = WirePosition {
            x: 47.5,
            y: 8.25,
            z: 10.0,
        };
        decode_position(&mut cmd, Frame::GlobalRelativeAlt, pos, &home());
        assert_eq!(cmd.alt, 48_800 + 1000);
        assert!(cmd.options.contains(CommandOptions::RELATIVE_ALT));
    }

    #[test]
    fn test_decode_local_ned() {
        let mut cmd = Command::default();
        let pos = WirePosition {
            x: 100.0,
            y: 50.0,
            z: -5.0,
        };
        decode_position(&mut cmd, Frame::LocalNed, pos, &home());
        let (n, e, d) = home().ned_of(cmd.lat, cmd.lng, cmd.alt);
        assert!((n - 100.0).abs() < 0.05);
        assert!((e - 50.0).abs() < 0.05);
        assert!((d + 5.0).abs() < 0.01);
    }

    #[test]
    fn test_encode_relative_alt_subtracts_home() {
        let mut cmd = Command::waypoint(475_000_000, 82_500_000, 49_800, 2.0);
        cmd.options = CommandOptions::RELATIVE_ALT;
        let (frame, pos) = encode_position(&cmd, &home());
        assert_eq!(frame, Frame::GlobalRelativeAlt);
        assert!((pos.z - 10.0).abs() < 1e-4);
        assert!((pos.x - 47.5).abs() < 1e-5);
    }

    #[test]
    fn test_encode_non_nav_sends_zero_position() {
        let cmd = Command {
            id: MAV_CMD_DO_JUMP,
            lat: 3,
            ..Command::default()
        };
        let (frame, pos) = encode_position(&cmd, &home());
        assert_eq!(frame, Frame::Global);
        assert_eq!(pos, WirePosition::default());
    }
}
