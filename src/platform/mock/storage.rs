//! In-memory parameter persistence

use apo_core::parameters::{ParamPersistence, ParamValue, ParameterError};
use std::collections::BTreeMap;

/// Parameter backend that keeps records in a map
///
/// Stands in for flash storage in tests. `fail_writes` makes every save
/// fail so error paths can be exercised.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: BTreeMap<u16, ParamValue>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record for `key`
    pub fn record(&self, key: u16) -> Option<&ParamValue> {
        self.records.get(&key)
    }

    /// Number of successful saves
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl ParamPersistence for MemoryStorage {
    fn load(&self, key: u16) -> Option<ParamValue> {
        self.records.get(&key).cloned()
    }

    fn save(&mut self, key: u16, value: &ParamValue) -> Result<(), ParameterError> {
        if self.fail_writes {
            return Err(ParameterError::Storage);
        }
        self.records.insert(key, value.clone());
        self.writes += 1;
        Ok(())
    }
}
