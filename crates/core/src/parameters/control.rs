//! Controller Parameter Definitions
//!
//! # Parameters
//!
//! - `CNTRL_MODE` - 0 = follow the mode channel, 1 = force manual pass-through
//! - `STR_P`, `STR_I`, `STR_D`, `STR_IMAX`, `STR_YMAX`, `STR_FCUT` - Steering compensator
//! - `THR_P`, `THR_I`, `THR_D`, `THR_IMAX`, `THR_YMAX`, `THR_FCUT` - Throttle compensator

use super::error::ParameterError;
use super::load_float;
use super::storage::{ParamFlags, ParamValue, ParameterStore, PARAM_NAME_LEN};
use heapless::String;

const MAX_GAIN: f32 = 100.0;
const MAX_LIMIT: f32 = 1000.0;
const MAX_FCUT: f32 = 200.0;

pub const KEY_MODE: u16 = 20;
pub const KEY_STEERING_BASE: u16 = 21;
pub const KEY_THROTTLE_BASE: u16 = 31;

const SUFFIXES: [&str; 6] = ["P", "I", "D", "IMAX", "YMAX", "FCUT"];

/// Gains and limits of one PID compensator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Integrator clamp
    pub i_max: f32,
    /// Output clamp
    pub y_max: f32,
    /// Derivative low-pass cutoff (Hz)
    pub f_cut: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32, i_max: f32, y_max: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            i_max,
            y_max,
            f_cut: 20.0,
        }
    }

    fn as_array(&self) -> [f32; 6] {
        [self.kp, self.ki, self.kd, self.i_max, self.y_max, self.f_cut]
    }

    /// Register `<prefix>P` .. `<prefix>FCUT` with these values as defaults
    pub fn register(
        &self,
        store: &mut ParameterStore,
        prefix: &str,
        key_base: u16,
    ) -> Result<(), ParameterError> {
        for (offset, (suffix, value)) in SUFFIXES.iter().zip(self.as_array()).enumerate() {
            let name = param_name(prefix, suffix)?;
            store.register(
                &name,
                key_base + offset as u16,
                ParamValue::Float(value),
                ParamFlags::empty(),
            )?;
        }
        Ok(())
    }

    /// Load a gain set, falling back to `defaults` for missing entries
    pub fn load(store: &ParameterStore, prefix: &str, defaults: &PidGains) -> Self {
        let mut values = defaults.as_array();
        let maxima = [MAX_GAIN, MAX_GAIN, MAX_GAIN, MAX_LIMIT, MAX_LIMIT, MAX_FCUT];
        for ((suffix, value), max) in SUFFIXES.iter().zip(values.iter_mut()).zip(maxima) {
            if let Ok(name) = param_name(prefix, suffix) {
                *value = load_float(store, &name, *value, 0.0, max);
            }
        }
        let [kp, ki, kd, i_max, y_max, f_cut] = values;
        Self {
            kp,
            ki,
            kd,
            i_max,
            y_max,
            f_cut,
        }
    }
}

fn param_name(prefix: &str, suffix: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut name = String::new();
    name.push_str(prefix)
        .map_err(|_| ParameterError::InvalidConfig)?;
    name.push_str(suffix)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(name)
}

/// Car controller parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct ControlParams {
    /// Force manual pass-through regardless of the mode channel
    pub force_manual: bool,
    /// Heading-error compensator (derivative from measured yaw rate)
    pub steering: PidGains,
    /// Ground-speed-error compensator
    pub throttle: PidGains,
}

impl ControlParams {
    pub const DEFAULT_STEERING: PidGains = PidGains::new(1.0, 0.0, 0.0, 0.0, 3.0);
    pub const DEFAULT_THROTTLE: PidGains = PidGains::new(0.6, 0.5, 0.0, 1.0, 3.0);

    /// Register controller parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("CNTRL_MODE", KEY_MODE, ParamValue::Int8(0), ParamFlags::empty())?;
        Self::DEFAULT_STEERING.register(store, "STR_", KEY_STEERING_BASE)?;
        Self::DEFAULT_THROTTLE.register(store, "THR_", KEY_THROTTLE_BASE)?;
        Ok(())
    }

    /// Load controller parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            force_manual: load_float(store, "CNTRL_MODE", 0.0, 0.0, 1.0) >= 1.0,
            steering: PidGains::load(store, "STR_", &Self::DEFAULT_STEERING),
            throttle: PidGains::load(store, "THR_", &Self::DEFAULT_THROTTLE),
        }
    }
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            force_manual: false,
            steering: Self::DEFAULT_STEERING,
            throttle: Self::DEFAULT_THROTTLE,
        }
    }
}
