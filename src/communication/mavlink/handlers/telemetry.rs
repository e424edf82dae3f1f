//! Telemetry message builders
//!
//! Outbound periodic telemetry is fire-and-forget. The caller decides the
//! cadence; each builder turns the current vehicle state into one message.
//!
//! - HEARTBEAT: vehicle type and control mode
//! - ATTITUDE: roll/pitch/yaw and body rates
//! - GLOBAL_POSITION_INT: fixed-point position and NED velocity
//! - RC_CHANNELS_SCALED: actuator positions scaled to +-10000
//! - STATUSTEXT: free-form operator text

use apo_core::control::ControlMode;
use apo_core::mission::Command;
use apo_core::navigation::NavState;
use mavlink::common::{
    MavAutopilot, MavMessage, MavModeFlag, MavSeverity, MavState, MavType, ATTITUDE_DATA,
    GLOBAL_POSITION_INT_DATA, HEARTBEAT_DATA, RC_CHANNELS_SCALED_DATA, STATUSTEXT_DATA,
};

/// Custom mode reported while the pilot drives
pub const CUSTOM_MODE_MANUAL: u32 = 0;
/// Custom mode reported while the guide drives
pub const CUSTOM_MODE_AUTO: u32 = 10;

/// STATUSTEXT payload length
pub const STATUS_TEXT_LEN: usize = 50;

/// Channels carried by RC_CHANNELS_SCALED
pub const SCALED_CHANNELS: usize = 8;

const RSSI_UNKNOWN: u8 = 255;

fn time_boot_ms(now_us: u64) -> u32 {
    (now_us / 1000) as u32
}

/// Build HEARTBEAT
pub fn heartbeat(vehicle: MavType, mode: ControlMode) -> MavMessage {
    let (custom_mode, mode_flag) = match mode {
        ControlMode::Manual => (
            CUSTOM_MODE_MANUAL,
            MavModeFlag::MAV_MODE_FLAG_MANUAL_INPUT_ENABLED,
        ),
        ControlMode::Auto => (CUSTOM_MODE_AUTO, MavModeFlag::MAV_MODE_FLAG_AUTO_ENABLED),
    };

    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode,
        mavtype: vehicle,
        autopilot: MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
        base_mode: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED | mode_flag,
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
    })
}

/// Build ATTITUDE from the navigation snapshot
pub fn attitude(nav: &NavState, now_us: u64) -> MavMessage {
    MavMessage::ATTITUDE(ATTITUDE_DATA {
        time_boot_ms: time_boot_ms(now_us),
        roll: nav.roll,
        pitch: nav.pitch,
        yaw: nav.yaw,
        rollspeed: nav.roll_rate,
        pitchspeed: nav.pitch_rate,
        yawspeed: nav.yaw_rate,
    })
}

/// Build GLOBAL_POSITION_INT; relative altitude is measured from `home`
pub fn global_position(nav: &NavState, home: &Command, now_us: u64) -> MavMessage {
    let heading_cdeg = (nav.heading.to_degrees().rem_euclid(360.0) * 100.0).round() as u16;

    MavMessage::GLOBAL_POSITION_INT(GLOBAL_POSITION_INT_DATA {
        time_boot_ms: time_boot_ms(now_us),
        lat: nav.lat,
        lon: nav.lon,
        alt: nav.alt_mm,
        relative_alt: nav.alt_mm.saturating_sub(home.alt.saturating_mul(10)),
        vx: cm_per_s(nav.v_n()),
        vy: cm_per_s(nav.v_e()),
        vz: cm_per_s(nav.v_d),
        hdg: heading_cdeg % 36000,
    })
}

fn cm_per_s(v: f32) -> i16 {
    (v * 100.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Build RC_CHANNELS_SCALED from normalized actuator positions.
///
/// Positions beyond the eighth are not reported; missing ones read 0.
pub fn rc_channels_scaled(outputs: &[f32], now_us: u64) -> MavMessage {
    let mut scaled = [0i16; SCALED_CHANNELS];
    for (slot, position) in scaled.iter_mut().zip(outputs) {
        *slot = (position.clamp(-1.0, 1.0) * 10000.0).round() as i16;
    }

    MavMessage::RC_CHANNELS_SCALED(RC_CHANNELS_SCALED_DATA {
        time_boot_ms: time_boot_ms(now_us),
        chan1_scaled: scaled[0],
        chan2_scaled: scaled[1],
        chan3_scaled: scaled[2],
        chan4_scaled: scaled[3],
        chan5_scaled: scaled[4],
        chan6_scaled: scaled[5],
        chan7_scaled: scaled[6],
        chan8_scaled: scaled[7],
        port: 0,
        rssi: RSSI_UNKNOWN,
    })
}

/// Build STATUSTEXT; text longer than the payload is truncated
pub fn status_text(severity: MavSeverity, text: &str) -> MavMessage {
    let bytes = text.as_bytes();
    let len = bytes.len().min(STATUS_TEXT_LEN);
    let mut text_bytes = [0u8; STATUS_TEXT_LEN];
    text_bytes[..len].copy_from_slice(&bytes[..len]);

    MavMessage::STATUSTEXT(STATUSTEXT_DATA {
        severity,
        text: text_bytes.into(),
        ..Default::default()
    })
}
