//! Platform abstraction layer
//!
//! Hardware-facing interfaces the autopilot consumes, plus in-memory
//! implementations for host-side testing.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{PlatformError, Result};
pub use traits::SerialChannel;
