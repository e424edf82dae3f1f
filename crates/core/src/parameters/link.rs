//! Ground-station link parameters
//!
//! - `SYSID_THISMAV` - MAVLink system id of this vehicle
//! - `CMD_TOTAL` - Number of mission commands (excluding home), read-only

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

const DEFAULT_SYSTEM_ID: i16 = 1;

pub const KEY_SYSTEM_ID: u16 = 1;
pub const KEY_CMD_TOTAL: u16 = 2;

/// Link parameters loaded from parameter store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkParams {
    pub system_id: u8,
    pub cmd_total: u16,
}

impl LinkParams {
    /// Register link parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            "SYSID_THISMAV",
            KEY_SYSTEM_ID,
            ParamValue::Int16(DEFAULT_SYSTEM_ID),
            ParamFlags::empty(),
        )?;
        store.register(
            "CMD_TOTAL",
            KEY_CMD_TOTAL,
            ParamValue::Int16(0),
            ParamFlags::READ_ONLY,
        )?;
        Ok(())
    }

    /// Load link parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        let system_id = match store.get("SYSID_THISMAV") {
            Some(ParamValue::Int16(v)) if (1..=255).contains(v) => *v as u8,
            _ => DEFAULT_SYSTEM_ID as u8,
        };
        let cmd_total = match store.get("CMD_TOTAL") {
            Some(ParamValue::Int16(v)) if *v >= 0 => *v as u16,
            _ => 0,
        };
        Self {
            system_id,
            cmd_total,
        }
    }
}
