//! Core traits for platform-agnostic timing
//!
//! Trait definitions are pure and have no feature gates. The mock is always
//! available for host testing.

pub mod time;

pub use time::{MockTime, TimeSource};
