//! Mission Management Types
//!
//! Pure data structures for mission storage: the on-board [`Command`]
//! representation, the home-first [`CommandList`], and the transforms
//! between wire mission items and commands.
//!
//! # Wire conversion
//!
//! - [`frame`]: position fields per reference frame
//! - [`remap`]: command-specific parameter placement

pub mod command;
pub mod error;
pub mod frame;
pub mod list;
pub mod remap;

pub use command::{cmd_has_location, Command, CommandOptions};
pub use error::MissionError;
pub use frame::{decode_position, encode_position, Frame, WirePosition};
pub use list::{CommandList, MAX_COMMANDS};
pub use remap::WireParams;
