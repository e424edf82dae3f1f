//! MAVLink Protocol Communication
//!
//! This module implements the ground-station link: a message-driven
//! responder over a point-to-point serial channel.
//!
//! # Architecture
//!
//! - **Parser**: Streaming frame extraction from received bytes
//! - **Writer**: Message serialization onto the channel
//! - **Registry**: Limits the number of concurrently active links
//! - **Handlers**: Protocol-specific message handlers (param, mission, command, telemetry, HIL)
//! - **Link**: [`CommLink`], which owns one channel and dispatches to the handlers
//!
//! # Usage
//!
//! ```
//! use apo::communication::mavlink::{ChannelRegistry, CommLink, LinkConfig};
//! use apo::platform::mock::MockSerial;
//!
//! let mut registry = ChannelRegistry::new();
//! let link = CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry);
//! assert!(link.is_active());
//! ```

pub mod handlers;
pub mod link;
pub mod parser;
pub mod registry;
pub mod writer;

pub use link::{CommLink, LinkConfig, LinkContext, LinkStats, MessageKind, TelemetrySource};
pub use parser::MavlinkParser;
pub use registry::{ChannelId, ChannelRegistry, MAX_CHANNELS};
pub use writer::MavlinkWriter;

use crate::platform::PlatformError;

/// Length of a MAVLink parameter id
pub const PARAM_ID_LEN: usize = 16;

/// Link-level failures. Logged and counted, never returned from the link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("message encoding failed: {0}")]
    Encode(String),

    #[error("channel error: {0}")]
    Platform(#[from] PlatformError),
}

/// Pack a parameter name into a NUL-padded wire id
pub fn name_to_param_id(name: &str) -> [u8; PARAM_ID_LEN] {
    let mut id = [0u8; PARAM_ID_LEN];
    let len = name.len().min(PARAM_ID_LEN);
    id[..len].copy_from_slice(&name.as_bytes()[..len]);
    id
}

/// Parameter name carried by a wire id, up to the first NUL
pub fn param_id_to_name(id: &[u8; PARAM_ID_LEN]) -> Option<&str> {
    let len = id.iter().position(|&b| b == 0).unwrap_or(PARAM_ID_LEN);
    if len == 0 {
        return None;
    }
    core::str::from_utf8(&id[..len]).ok()
}
