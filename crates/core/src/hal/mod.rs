//! Hardware abstraction consumed by the controller and guide
//!
//! The core never drives hardware itself. RC/actuator channels and range
//! finders are injected as trait objects; the platform crate provides the
//! implementations.

pub mod range_finder;
pub mod rc;

pub use range_finder::{Orientation, RangeFinder};
pub use rc::{RcCalibration, RcChannel};
