//! apo - Ground-rover autopilot with a MAVLink ground-station link
//!
//! This library wires the platform-agnostic logic in `apo_core` to serial
//! channels, the MAVLink protocol and a cooperative main loop.

// Platform abstraction: serial channels, errors and in-memory doubles
pub mod platform;

// Logging macros shared by every module
pub mod core;

// Ground-station protocol (MAVLink over serial)
pub mod communication;

// Vehicle main loop tying navigation, guidance, control and links together
pub mod rover;

pub use apo_core;
