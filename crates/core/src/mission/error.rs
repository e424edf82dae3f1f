//! Mission error types

/// Errors from mission list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionError {
    /// Index beyond the current list length
    IndexOutOfRange,
    /// Requested size exceeds list capacity
    CapacityExceeded,
    /// Index 0 is home and can only be changed with `set_home`
    HomeProtected,
}

impl core::fmt::Display for MissionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MissionError::IndexOutOfRange => write!(f, "mission index out of range"),
            MissionError::CapacityExceeded => write!(f, "mission capacity exceeded"),
            MissionError::HomeProtected => write!(f, "home command is write-protected"),
        }
    }
}
