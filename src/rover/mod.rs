//! Rover vehicle implementation
//!
//! Ties navigation, guidance, control and the ground-station links together
//! in one cooperative loop.
//!
//! ## Modules
//!
//! - `autopilot`: The [`Autopilot`] loop and its construction settings

pub mod autopilot;

// Re-export commonly used types
pub use autopilot::{Autopilot, AutopilotConfig, AutopilotError, RoverChannels};
