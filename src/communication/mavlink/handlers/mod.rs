//! MAVLink Protocol Handlers
//!
//! Message-specific handlers used by [`CommLink`](super::CommLink).
//!
//! # Handlers
//!
//! - **Parameter Handler**: PARAM_REQUEST_LIST, PARAM_REQUEST_READ, PARAM_SET
//! - **Mission Handler**: mission upload and download, MISSION_CLEAR_ALL, MISSION_SET_CURRENT
//! - **Command Handler**: COMMAND_LONG, COMMAND_ACK
//! - **Telemetry**: HEARTBEAT, ATTITUDE, GLOBAL_POSITION_INT, RC_CHANNELS_SCALED, STATUSTEXT
//! - **HIL**: ATTITUDE and GPS_RAW_INT injected into the navigator

pub mod command;
pub mod hil;
pub mod mission;
pub mod param;
pub mod telemetry;

// Re-export commonly used types
pub use command::{CommandHandler, CommandTarget};
pub use mission::{MissionHandler, MissionTransfer, Peer};
pub use param::ParamHandler;
