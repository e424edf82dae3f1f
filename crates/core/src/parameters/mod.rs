//! Parameter management types and utilities
//!
//! This module provides the parameter store shared by the control loops and
//! the ground-station link, the persistence backend trait, and the typed
//! parameter groups each subsystem loads its configuration from.

pub mod control;
pub mod error;
pub mod guide;
pub mod link;
pub mod persist;
pub mod storage;

pub use control::{ControlParams, PidGains};
pub use error::ParameterError;
pub use guide::GuideParams;
pub use link::LinkParams;
pub use persist::ParamPersistence;
pub use storage::{
    ParamEntry, ParamFlags, ParamType, ParamValue, ParameterStore, MAX_PARAMS, MAX_STRING_LEN,
    PARAM_NAME_LEN, ROUNDING_BIAS,
};

/// Load a numeric parameter from store with clamping
fn load_float(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    match store.get_float(name) {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => default,
    }
}
