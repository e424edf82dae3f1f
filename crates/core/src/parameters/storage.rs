//! Parameter Storage Types
//!
//! Provides the typed parameter values and the `ParameterStore` that the
//! control loops read their gains from and the ground-station link
//! enumerates, reads and writes.
//!
//! Every entry carries a stable persistence key. The protocol index is not
//! stored anywhere: it is the entry's position among the float-castable
//! entries in registration order.

use super::error::ParameterError;
use super::persist::ParamPersistence;
use bitflags::bitflags;
use core::cell::Cell;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length (MAVLink `param_id` width)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 64;

/// Maximum text parameter length
pub const MAX_STRING_LEN: usize = 31;

/// Bias added to a float before truncating it into an integer parameter
pub const ROUNDING_BIAS: f32 = 0.01;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter cannot be modified by the ground station
        const READ_ONLY = 0b00000001;
    }
}

/// Declared storage type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Float,
    /// Half-precision on the wire, held as `f32`
    Float16,
    Int32,
    Int16,
    Int8,
    Text,
}

/// Parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Float16(f32),
    Int32(i32),
    Int16(i16),
    Int8(i8),
    /// Non-numeric value; never streamed and never remotely settable
    Text(String<MAX_STRING_LEN>),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Float16(_) => ParamType::Float16,
            ParamValue::Int32(_) => ParamType::Int32,
            ParamValue::Int16(_) => ParamType::Int16,
            ParamValue::Int8(_) => ParamType::Int8,
            ParamValue::Text(_) => ParamType::Text,
        }
    }

    /// Value as a float; NaN for non-numeric values
    pub fn cast_to_float(&self) -> f32 {
        match self {
            ParamValue::Float(v) | ParamValue::Float16(v) => *v,
            ParamValue::Int32(v) => *v as f32,
            ParamValue::Int16(v) => *v as f32,
            ParamValue::Int8(v) => *v as f32,
            ParamValue::Text(_) => f32::NAN,
        }
    }

    /// Build a value of type `ty` from a float.
    ///
    /// Integer types add [`ROUNDING_BIAS`] and then truncate toward zero, so
    /// `4.6` stored into an `Int8` becomes `4`. Out-of-range values saturate.
    pub fn from_float(ty: ParamType, value: f32) -> Result<Self, ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::InvalidValue);
        }
        let biased = value + ROUNDING_BIAS;
        match ty {
            ParamType::Float => Ok(ParamValue::Float(value)),
            ParamType::Float16 => Ok(ParamValue::Float16(value)),
            ParamType::Int32 => Ok(ParamValue::Int32(biased as i32)),
            ParamType::Int16 => Ok(ParamValue::Int16(biased as i16)),
            ParamType::Int8 => Ok(ParamValue::Int8(biased as i8)),
            ParamType::Text => Err(ParameterError::UnsupportedType),
        }
    }

    fn is_streamable(&self) -> bool {
        !self.cast_to_float().is_nan()
    }

    fn is_finite_or_text(&self) -> bool {
        matches!(self, ParamValue::Text(_)) || self.cast_to_float().is_finite()
    }
}

/// A registered parameter
#[derive(Debug, Clone)]
pub struct ParamEntry {
    /// Stable persistence key
    pub key: u16,
    pub value: ParamValue,
    pub flags: ParamFlags,
}

/// Parameter store
///
/// Entries keep their registration order. A generation counter increments
/// on every successful change so consumers can reload cached gains.
pub struct ParameterStore {
    entries: FnvIndexMap<String<PARAM_NAME_LEN>, ParamEntry, MAX_PARAMS>,
    generation: u32,
    streamable_count: Cell<Option<u16>>,
    dirty: bool,
}

fn make_key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::<PARAM_NAME_LEN>::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            generation: 0,
            streamable_count: Cell::new(None),
            dirty: false,
        }
    }

    /// Register a parameter with its default value.
    ///
    /// If the name already exists this is a no-op, so parameter groups can
    /// register their defaults more than once.
    pub fn register(
        &mut self,
        name: &str,
        key: u16,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let name = make_key(name)?;
        if self.entries.contains_key(&name) {
            return Ok(());
        }
        self.entries
            .insert(
                name,
                ParamEntry {
                    key,
                    value: default_value,
                    flags,
                },
            )
            .map_err(|_| ParameterError::StoreFull)?;
        self.streamable_count.set(None);
        Ok(())
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let name = make_key(name).ok()?;
        self.entries.get(&name).map(|entry| &entry.value)
    }

    /// Get parameter value cast to a float
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).map(ParamValue::cast_to_float)
    }

    /// Get the full entry for a parameter
    pub fn entry(&self, name: &str) -> Option<&ParamEntry> {
        let name = make_key(name).ok()?;
        self.entries.get(&name)
    }

    /// Set a parameter to a value of its declared type
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let name = make_key(name)?;
        let entry = self
            .entries
            .get_mut(&name)
            .ok_or(ParameterError::InvalidConfig)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if entry.value.param_type() != value.param_type() {
            return Err(ParameterError::InvalidConfig);
        }
        if !value.is_finite_or_text() {
            return Err(ParameterError::InvalidValue);
        }
        entry.value = value;
        self.generation = self.generation.wrapping_add(1);
        self.dirty = true;
        Ok(())
    }

    /// Set a parameter from on-board code, ignoring `READ_ONLY`
    pub fn force_set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let name = make_key(name)?;
        let entry = self
            .entries
            .get_mut(&name)
            .ok_or(ParameterError::InvalidConfig)?;
        if entry.value.param_type() != value.param_type() {
            return Err(ParameterError::InvalidConfig);
        }
        entry.value = value;
        self.generation = self.generation.wrapping_add(1);
        self.dirty = true;
        Ok(())
    }

    /// Set a parameter from a float, converting into its declared type.
    ///
    /// Returns the value actually stored, cast back to a float, so the caller
    /// can report truncation.
    pub fn set_from_float(&mut self, name: &str, value: f32) -> Result<f32, ParameterError> {
        let ty = self
            .get(name)
            .map(ParamValue::param_type)
            .ok_or(ParameterError::InvalidConfig)?;
        let value = ParamValue::from_float(ty, value)?;
        let stored = value.cast_to_float();
        self.set(name, value)?;
        Ok(stored)
    }

    /// Set a parameter from a float and persist it immediately
    pub fn set_and_save(
        &mut self,
        name: &str,
        value: f32,
        backend: &mut dyn ParamPersistence,
    ) -> Result<f32, ParameterError> {
        let stored = self.set_from_float(name, value)?;
        if let Some(entry) = self.entry(name) {
            backend.save(entry.key, &entry.value)?;
        }
        Ok(stored)
    }

    /// Number of entries that can be streamed as floats.
    ///
    /// Computed on first use and cached until the next registration.
    pub fn streamable_count(&self) -> u16 {
        if let Some(count) = self.streamable_count.get() {
            return count;
        }
        let count = self
            .entries
            .values()
            .filter(|entry| entry.value.is_streamable())
            .count() as u16;
        self.streamable_count.set(Some(count));
        count
    }

    /// Streamable entry at protocol `index`
    pub fn streamable(&self, index: u16) -> Option<(&str, &ParamValue)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.value.is_streamable())
            .nth(index as usize)
            .map(|(name, entry)| (name.as_str(), &entry.value))
    }

    /// Protocol index of a streamable parameter
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.value.is_streamable())
            .position(|(entry_name, _)| entry_name.as_str() == name)
            .map(|index| index as u16)
    }

    /// Iterate over all entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Replace every value the backend has a record for.
    ///
    /// Records whose type does not match the registered type are ignored.
    /// Returns the number of values loaded.
    pub fn load_all(&mut self, backend: &dyn ParamPersistence) -> usize {
        let mut loaded = 0;
        for entry in self.entries.values_mut() {
            if let Some(value) = backend.load(entry.key) {
                if value.param_type() == entry.value.param_type() && value.is_finite_or_text() {
                    entry.value = value;
                    loaded += 1;
                }
            }
        }
        if loaded > 0 {
            self.generation = self.generation.wrapping_add(1);
        }
        self.dirty = false;
        loaded
    }

    /// Write every value to the backend. Returns the number of values saved.
    pub fn save_all(&mut self, backend: &mut dyn ParamPersistence) -> Result<usize, ParameterError> {
        let mut saved = 0;
        for entry in self.entries.values() {
            backend.save(entry.key, &entry.value)?;
            saved += 1;
        }
        self.dirty = false;
        Ok(saved)
    }

    /// Generation counter, incremented on every change
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if store has changes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Total parameter count, including non-streamable entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
