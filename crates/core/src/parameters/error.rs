//! Parameter error types

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// Name too long or unknown parameter
    InvalidConfig,
    /// Store is full
    StoreFull,
    /// Read-only parameter cannot be modified
    ReadOnly,
    /// Value is NaN or infinite
    InvalidValue,
    /// Parameter type cannot be set from a float (text parameters)
    UnsupportedType,
    /// Persistence backend rejected the operation
    Storage,
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterError::InvalidConfig => write!(f, "invalid parameter configuration"),
            ParameterError::StoreFull => write!(f, "parameter store full"),
            ParameterError::ReadOnly => write!(f, "parameter is read-only"),
            ParameterError::InvalidValue => write!(f, "parameter value is not finite"),
            ParameterError::UnsupportedType => write!(f, "parameter type not settable"),
            ParameterError::Storage => write!(f, "parameter storage failure"),
        }
    }
}
