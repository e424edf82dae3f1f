//! Platform error types
//!
//! Serial failures surfaced by platform implementations.

use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Serial write accepted fewer bytes than requested
    #[error("serial write truncated: {written} of {requested} bytes")]
    WriteTruncated { written: usize, requested: usize },

    /// Serial channel is closed or unplugged
    #[error("serial channel closed")]
    ChannelClosed,
}
