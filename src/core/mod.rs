//! Crate-wide infrastructure
//!
//! The pure autopilot logic lives in `apo_core`; this module only carries
//! the pieces that depend on the build target, such as logging.

pub mod logging;
