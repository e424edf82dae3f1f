//! Guide Parameter Definitions
//!
//! # Parameters
//!
//! - `WP_RADIUS` - Acceptance radius used when a waypoint carries none (m)
//! - `GD_XTRK_GAIN` - Cross-track correction gain (rad/m)
//! - `GD_CRUISE` - Nominal ground speed command (m/s)
//! - `GD_AIRSPD` - Nominal air speed command (m/s)

use super::error::ParameterError;
use super::load_float;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

const DEFAULT_WP_RADIUS: f32 = 2.0;
const DEFAULT_XTRACK_GAIN: f32 = 0.001;
const DEFAULT_CRUISE_SPEED: f32 = 3.0;
const DEFAULT_AIR_SPEED: f32 = 0.0;

const MIN_WP_RADIUS: f32 = 0.1;
const MAX_WP_RADIUS: f32 = 100.0;
const MAX_XTRACK_GAIN: f32 = 1.0;
const MAX_SPEED: f32 = 50.0;

pub const KEY_WP_RADIUS: u16 = 10;
pub const KEY_XTRACK_GAIN: u16 = 11;
pub const KEY_CRUISE_SPEED: u16 = 12;
pub const KEY_AIR_SPEED: u16 = 13;

/// Guide parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct GuideParams {
    /// Fallback acceptance radius in meters
    pub wp_radius: f32,
    /// Heading correction per meter of cross-track error
    pub xtrack_gain: f32,
    /// Ground speed command in meters per second
    pub cruise_speed: f32,
    /// Air speed command in meters per second
    pub air_speed: f32,
}

impl Default for GuideParams {
    fn default() -> Self {
        Self {
            wp_radius: DEFAULT_WP_RADIUS,
            xtrack_gain: DEFAULT_XTRACK_GAIN,
            cruise_speed: DEFAULT_CRUISE_SPEED,
            air_speed: DEFAULT_AIR_SPEED,
        }
    }
}

impl GuideParams {
    /// Register guide parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            "WP_RADIUS",
            KEY_WP_RADIUS,
            ParamValue::Float(DEFAULT_WP_RADIUS),
            ParamFlags::empty(),
        )?;
        store.register(
            "GD_XTRK_GAIN",
            KEY_XTRACK_GAIN,
            ParamValue::Float(DEFAULT_XTRACK_GAIN),
            ParamFlags::empty(),
        )?;
        store.register(
            "GD_CRUISE",
            KEY_CRUISE_SPEED,
            ParamValue::Float(DEFAULT_CRUISE_SPEED),
            ParamFlags::empty(),
        )?;
        store.register(
            "GD_AIRSPD",
            KEY_AIR_SPEED,
            ParamValue::Float(DEFAULT_AIR_SPEED),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load guide parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            wp_radius: load_float(
                store,
                "WP_RADIUS",
                DEFAULT_WP_RADIUS,
                MIN_WP_RADIUS,
                MAX_WP_RADIUS,
            ),
            xtrack_gain: load_float(
                store,
                "GD_XTRK_GAIN",
                DEFAULT_XTRACK_GAIN,
                0.0,
                MAX_XTRACK_GAIN,
            ),
            cruise_speed: load_float(store, "GD_CRUISE", DEFAULT_CRUISE_SPEED, 0.0, MAX_SPEED),
            air_speed: load_float(store, "GD_AIRSPD", DEFAULT_AIR_SPEED, 0.0, MAX_SPEED),
        }
    }
}
