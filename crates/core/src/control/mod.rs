//! Control
//!
//! Closed-loop control built from block chains:
//!
//! - [`block`]: signal arena and ordered block chain
//! - [`pid`]: PID and derivative-feedback PID compensators
//! - [`car`]: ground-rover steering/throttle controller with manual pass-through

pub mod block;
pub mod car;
pub mod error;
pub mod pid;

pub use block::{Block, BlockChain, BlockId, BlockKind, Signal, MAX_ACTUATORS, MAX_BLOCKS, MAX_PORTS, MAX_SIGNALS};
pub use car::{CarChannels, CarController, ControlMode, CH_STEERING, CH_THROTTLE};
pub use error::ControlError;
pub use pid::{Pid, PidDfb, PidState};
