//! Platform abstraction traits
//!
//! RC channels, range finders and parameter persistence are defined in
//! `apo_core`; this module adds the byte channels the protocol runs over.

pub mod serial;

pub use serial::SerialChannel;
