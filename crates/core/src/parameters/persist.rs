//! Persistence backend for parameter values
//!
//! The store never touches storage directly. A backend keyed by each
//! parameter's stable `u16` key provides typed load and save.

use super::error::ParameterError;
use super::storage::ParamValue;

/// Named-value persistence consumed by [`ParameterStore`](super::ParameterStore)
pub trait ParamPersistence {
    /// Load the stored value for `key`, if any
    fn load(&self, key: u16) -> Option<ParamValue>;

    /// Store `value` under `key`
    fn save(&mut self, key: u16, value: &ParamValue) -> Result<(), ParameterError>;
}
