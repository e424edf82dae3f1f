//! Hardware-in-the-loop input
//!
//! A simulator on the other end of the link can stand in for the sensors by
//! sending ATTITUDE and GPS_RAW_INT. Both are written straight into the
//! navigator's state when it accepts injection; navigators backed by real
//! sensors ignore them.

use apo_core::navigation::Navigator;
use mavlink::common::{ATTITUDE_DATA, GPS_RAW_INT_DATA};

/// GPS_RAW_INT course value meaning "unknown"
const COG_UNKNOWN: u16 = u16::MAX;

/// Apply simulated attitude. Returns `false` when the navigator refuses injection.
pub fn apply_attitude(navigator: &mut dyn Navigator, data: &ATTITUDE_DATA, now_us: u64) -> bool {
    let Some(state) = navigator.hil_state() else {
        return false;
    };
    state.roll = data.roll;
    state.pitch = data.pitch;
    state.yaw = data.yaw;
    state.roll_rate = data.rollspeed;
    state.pitch_rate = data.pitchspeed;
    state.yaw_rate = data.yawspeed;
    state.timestamp_us = now_us;
    true
}

/// Apply a simulated GPS fix. Ground speed doubles as air speed.
pub fn apply_gps(navigator: &mut dyn Navigator, data: &GPS_RAW_INT_DATA, now_us: u64) -> bool {
    let Some(state) = navigator.hil_state() else {
        return false;
    };
    state.lat = data.lat;
    state.lon = data.lon;
    state.alt_mm = data.alt;
    state.ground_speed = data.vel as f32 / 100.0;
    state.air_speed = state.ground_speed;
    if data.cog != COG_UNKNOWN {
        state.heading = apo_core::geo::wrap_pi((data.cog as f32 / 100.0).to_radians());
    }
    state.timestamp_us = now_us;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_core::navigation::{HilNavigator, NavState};

    struct SensorNavigator(NavState);

    impl Navigator for SensorNavigator {
        fn update_fast(&mut self, _dt: f32) {}
        fn update_slow(&mut self, _dt: f32) {}
        fn state(&self) -> &NavState {
            &self.0
        }
    }

    #[test]
    fn test_attitude_injected() {
        let mut nav = HilNavigator::default();
        let data = ATTITUDE_DATA {
            roll: 0.2,
            yaw: -1.0,
            yawspeed: 0.5,
            ..Default::default()
        };
        assert!(apply_attitude(&mut nav, &data, 42));
        assert_eq!(nav.state().roll, 0.2);
        assert_eq!(nav.state().yaw_rate, 0.5);
        assert_eq!(nav.state().timestamp_us, 42);
    }

    #[test]
    fn test_gps_injected() {
        let mut nav = HilNavigator::default();
        let data = GPS_RAW_INT_DATA {
            lat: 473_977_000,
            lon: 85_455_000,
            alt: 488_000,
            vel: 250,
            cog: 27000,
            ..Default::default()
        };
        assert!(apply_gps(&mut nav, &data, 0));
        let state = nav.state();
        assert_eq!(state.lat, 473_977_000);
        assert_eq!(state.alt_mm, 488_000);
        assert_eq!(state.ground_speed, 2.5);
        assert_eq!(state.air_speed, 2.5);
        assert!((state.heading + core::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_course_keeps_heading() {
        let mut nav = HilNavigator::new(NavState {
            heading: 0.7,
            ..NavState::default()
        });
        let data = GPS_RAW_INT_DATA {
            cog: u16::MAX,
            ..Default::default()
        };
        apply_gps(&mut nav, &data, 0);
        assert_eq!(nav.state().heading, 0.7);
    }

    #[test]
    fn test_sensor_navigator_ignores_hil() {
        let mut nav = SensorNavigator(NavState::default());
        assert!(!apply_attitude(&mut nav, &ATTITUDE_DATA::default(), 0));
        assert_eq!(nav.state().roll, 0.0);
    }
}
