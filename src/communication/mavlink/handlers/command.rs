//! Command Protocol Handler
//!
//! Handles COMMAND_LONG messages from the ground station.
//!
//! # Supported Commands
//!
//! - **MAV_CMD_PREFLIGHT_STORAGE**: param1 0 reloads every parameter, 1 saves every parameter
//! - **MAV_CMD_MISSION_START**: switch to auto and restart the mission at the first command
//! - **MAV_CMD_DO_SET_MODE**: param2 carries the custom mode (manual or auto)
//! - **MAV_CMD_NAV_RETURN_TO_LAUNCH**: steer back to home in auto
//!
//! Mode changes go through the `CNTRL_MODE` parameter, so the controller
//! picks them up on its next parameter reload. The RC mode switch has
//! priority: while it selects manual, every request for auto is answered
//! `MAV_RESULT_TEMPORARILY_REJECTED` and changes nothing.
//!
//! Every command is answered with COMMAND_ACK. The ack carries no target
//! ids; the link sends it back on the channel the command arrived on.

use super::telemetry::{CUSTOM_MODE_AUTO, CUSTOM_MODE_MANUAL};
use apo_core::guide::Guide;
use apo_core::mission::CommandList;
use apo_core::parameters::{ParamPersistence, ParamValue, ParameterStore};
use mavlink::common::{MavCmd, MavMessage, MavResult, COMMAND_ACK_DATA, COMMAND_LONG_DATA};

/// Whatever a command may act on
pub struct CommandTarget<'a> {
    pub params: &'a mut ParameterStore,
    pub storage: &'a mut dyn ParamPersistence,
    pub mission: &'a CommandList,
    pub guide: &'a mut Guide,
    /// RC mode switch currently selects manual
    pub rc_manual: bool,
}

/// Command handler for COMMAND_LONG messages
#[derive(Debug, Default)]
pub struct CommandHandler {}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle COMMAND_LONG and build its COMMAND_ACK
    pub fn handle_command_long(
        &mut self,
        cmd: &COMMAND_LONG_DATA,
        target: CommandTarget<'_>,
    ) -> MavMessage {
        crate::log_debug!("Received COMMAND_LONG: command={}", cmd.command as u32);

        let result = match cmd.command {
            MavCmd::MAV_CMD_PREFLIGHT_STORAGE => Self::handle_storage(cmd, target),
            MavCmd::MAV_CMD_MISSION_START if target.rc_manual => rc_override(),
            MavCmd::MAV_CMD_MISSION_START => {
                target.guide.restart(target.mission);
                set_manual(target.params, false)
            }
            MavCmd::MAV_CMD_DO_SET_MODE => Self::handle_set_mode(cmd, target),
            MavCmd::MAV_CMD_NAV_RETURN_TO_LAUNCH if target.rc_manual => rc_override(),
            MavCmd::MAV_CMD_NAV_RETURN_TO_LAUNCH => {
                target.guide.return_home(target.mission);
                set_manual(target.params, false)
            }
            _ => {
                crate::log_warn!("Unsupported command: {}", cmd.command as u32);
                MavResult::MAV_RESULT_UNSUPPORTED
            }
        };

        MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
            command: cmd.command,
            result,
            ..Default::default()
        })
    }

    fn handle_storage(cmd: &COMMAND_LONG_DATA, target: CommandTarget<'_>) -> MavResult {
        match cmd.param1 as i32 {
            0 => {
                let loaded = target.params.load_all(target.storage);
                crate::log_info!("Loaded {} parameters", loaded);
                // the stored total belongs to whatever mission was saved last
                let total = i16::try_from(target.mission.command_count()).unwrap_or(i16::MAX);
                if let Err(e) = target.params.force_set("CMD_TOTAL", ParamValue::Int16(total)) {
                    crate::log_warn!("CMD_TOTAL not restored: {}", e);
                }
                MavResult::MAV_RESULT_ACCEPTED
            }
            1 => match target.params.save_all(target.storage) {
                Ok(saved) => {
                    crate::log_info!("Saved {} parameters", saved);
                    MavResult::MAV_RESULT_ACCEPTED
                }
                Err(e) => {
                    crate::log_error!("Parameter save failed: {}", e);
                    MavResult::MAV_RESULT_FAILED
                }
            },
            other => {
                crate::log_warn!("Unsupported storage action {}", other);
                MavResult::MAV_RESULT_DENIED
            }
        }
    }

    fn handle_set_mode(cmd: &COMMAND_LONG_DATA, target: CommandTarget<'_>) -> MavResult {
        match cmd.param2 as u32 {
            CUSTOM_MODE_MANUAL => set_manual(target.params, true),
            CUSTOM_MODE_AUTO if target.rc_manual => rc_override(),
            CUSTOM_MODE_AUTO => set_manual(target.params, false),
            other => {
                crate::log_warn!("Unknown custom mode {}", other);
                MavResult::MAV_RESULT_DENIED
            }
        }
    }
}

fn rc_override() -> MavResult {
    crate::log_warn!("Auto refused: RC mode switch selects manual");
    MavResult::MAV_RESULT_TEMPORARILY_REJECTED
}

fn set_manual(params: &mut ParameterStore, manual: bool) -> MavResult {
    match params.set("CNTRL_MODE", ParamValue::Int8(manual as i8)) {
        Ok(()) => {
            crate::log_info!("Mode set to {}", if manual { "MANUAL" } else { "AUTO" });
            MavResult::MAV_RESULT_ACCEPTED
        }
        Err(e) => {
            crate::log_warn!("Mode change rejected: {}", e);
            MavResult::MAV_RESULT_FAILED
        }
    }
}
