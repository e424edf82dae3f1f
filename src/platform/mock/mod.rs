//! Mock platform implementation for testing
//!
//! In-memory serial channels, parameter storage, RC channels and range
//! finders for unit and integration tests.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

mod range_finder;
mod rc;
mod serial;
mod storage;

pub use range_finder::MockRangeFinder;
pub use rc::MockRcChannel;
pub use serial::MockSerial;
pub use storage::MemoryStorage;
