//! Control error types

/// Errors from building a block chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// Block chain is full
    BlockCapacity,
    /// Signal arena is full
    SignalCapacity,
    /// Block has more input ports than supported
    PortCapacity,
    /// Signal or actuator index does not exist
    InvalidIndex,
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControlError::BlockCapacity => write!(f, "block chain full"),
            ControlError::SignalCapacity => write!(f, "signal arena full"),
            ControlError::PortCapacity => write!(f, "too many block ports"),
            ControlError::InvalidIndex => write!(f, "invalid signal or actuator index"),
        }
    }
}
