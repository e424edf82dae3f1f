//! Command-specific parameter remapping
//!
//! Several commands keep wire parameters in the on-board position fields
//! (`lat`, `lng`, `alt`) or in different units. Every id not listed here
//! carries `param1..param4` straight through to `p1..p4`.

use super::command::*;

/// `[param1, param2, param3, param4]` as they appear on the wire
pub type WireParams = [f32; 4];

/// Wire parameters for a command being downloaded
pub fn to_wire(command: &Command) -> WireParams {
    let mut params = [0.0; 4];
    match command.id {
        MAV_CMD_NAV_LOITER_TURNS | MAV_CMD_NAV_TAKEOFF | MAV_CMD_DO_SET_HOME => {
            params[0] = command.p1;
        }
        MAV_CMD_CONDITION_CHANGE_ALT => {
            params[0] = command.p1 / 100.0;
        }
        // loiter time is held in ten-second units
        MAV_CMD_NAV_LOITER_TIME => {
            params[0] = command.p1 * 10.0;
        }
        MAV_CMD_CONDITION_DELAY | MAV_CMD_CONDITION_DISTANCE => {
            params[0] = command.lat as f32;
        }
        MAV_CMD_DO_JUMP => {
            params[0] = command.p1;
            params[1] = command.lat as f32;
        }
        MAV_CMD_DO_REPEAT_SERVO => {
            params[0] = command.p1;
            params[1] = command.alt as f32;
            params[2] = command.lat as f32;
            params[3] = command.lng as f32;
        }
        MAV_CMD_DO_REPEAT_RELAY => {
            params[0] = command.p1;
            params[1] = command.alt as f32;
            params[2] = command.lat as f32;
        }
        // speed stays fractional in p2; throttle percent in lat
        MAV_CMD_DO_CHANGE_SPEED => {
            params[0] = command.p1;
            params[1] = command.p2;
            params[2] = command.lat as f32;
        }
        MAV_CMD_DO_SET_PARAMETER | MAV_CMD_DO_SET_RELAY | MAV_CMD_DO_SET_SERVO => {
            params[0] = command.p1;
            params[1] = command.alt as f32;
        }
        _ => {
            params = [command.p1, command.p2, command.p3, command.p4];
        }
    }
    params
}

/// Store uploaded wire parameters into `command` according to its id.
///
/// Position fields are only overwritten for commands that keep parameters
/// there; call this after decoding the position.
pub fn from_wire(command: &mut Command, params: WireParams) {
    let [param1, param2, param3, param4] = params;
    command.p1 = 0.0;
    command.p2 = 0.0;
    command.p3 = 0.0;
    command.p4 = 0.0;
    match command.id {
        MAV_CMD_NAV_LOITER_TURNS | MAV_CMD_NAV_TAKEOFF | MAV_CMD_DO_SET_HOME => {
            command.p1 = param1;
        }
        MAV_CMD_CONDITION_CHANGE_ALT => {
            command.p1 = param1 * 100.0;
        }
        MAV_CMD_NAV_LOITER_TIME => {
            command.p1 = param1 / 10.0;
        }
        MAV_CMD_CONDITION_DELAY | MAV_CMD_CONDITION_DISTANCE => {
            command.lat = param1 as i32;
        }
        MAV_CMD_DO_JUMP => {
            command.p1 = param1;
            command.lat = param2 as i32;
        }
        MAV_CMD_DO_REPEAT_SERVO => {
            command.p1 = param1;
            command.alt = param2 as i32;
            command.lat = param3 as i32;
            command.lng = param4 as i32;
        }
        MAV_CMD_DO_REPEAT_RELAY => {
            command.p1 = param1;
            command.alt = param2 as i32;
            command.lat = param3 as i32;
        }
        MAV_CMD_DO_CHANGE_SPEED => {
            command.p1 = param1;
            command.p2 = param2;
            command.lat = param3 as i32;
        }
        MAV_CMD_DO_SET_PARAMETER | MAV_CMD_DO_SET_RELAY | MAV_CMD_DO_SET_SERVO => {
            command.p1 = param1;
            command.alt = param2 as i32;
        }
        _ => {
            command.p1 = param1;
            command.p2 = param2;
            command.p3 = param3;
            command.p4 = param4;
        }
    }
}
