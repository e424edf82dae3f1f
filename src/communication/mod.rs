//! Communication Protocols
//!
//! Ground-station communication for the autopilot.
//!
//! # Protocols
//!
//! - **MAVLink**: the only ground-station protocol
//!   - Telemetry (HEARTBEAT, ATTITUDE, GLOBAL_POSITION_INT, RC_CHANNELS_SCALED)
//!   - Parameter management (PARAM_* messages)
//!   - Command execution (COMMAND_LONG)
//!   - Mission protocol (MISSION_* messages)
//!
//! Links run over any [`SerialChannel`](crate::platform::SerialChannel).

pub mod mavlink;
