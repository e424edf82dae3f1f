//! Mission Protocol Handler
//!
//! Handles mission upload and download via the MAVLink mission protocol.
//!
//! # Mission Upload Flow (GCS → Autopilot)
//!
//! 1. GCS sends MISSION_COUNT (home included, clamped to capacity)
//! 2. Autopilot requests seq 0, then each following seq in turn
//! 3. Items whose seq is not the expected one are dropped, not buffered
//! 4. Seq 0 (home) is accepted but never stored
//! 5. Once every item is in, the autopilot sends MISSION_ACK
//!
//! # Mission Download Flow (Autopilot → GCS)
//!
//! 1. GCS sends MISSION_REQUEST_LIST
//! 2. Autopilot responds with MISSION_COUNT (mission size + 1 for home)
//! 3. GCS sends MISSION_REQUEST for each seq, autopilot answers MISSION_ITEM
//! 4. GCS sends MISSION_ACK, which ends the download
//!
//! The handler never times out a transfer itself. The last-sent and
//! last-received timestamps are exposed so the caller can abandon one.

use apo_core::guide::Guide;
use apo_core::mission::remap::{from_wire, to_wire};
use apo_core::mission::{
    decode_position, encode_position, Command, CommandList, Frame, WirePosition, MAX_COMMANDS,
};
use apo_core::parameters::{ParamValue, ParameterStore};
use heapless::Vec;
use mavlink::common::{
    MavCmd, MavFrame, MavMessage, MavMissionResult, MISSION_ACK_DATA, MISSION_COUNT_DATA,
    MISSION_CURRENT_DATA, MISSION_ITEM_DATA, MISSION_REQUEST_DATA, MISSION_SET_CURRENT_DATA,
};
use num_traits::FromPrimitive;

/// Times MISSION_CLEAR_ALL is acknowledged
const CLEAR_ALL_ACKS: usize = 3;

/// Remote end of a transfer, taken from the request's header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Peer {
    pub system_id: u8,
    pub component_id: u8,
}

/// Mission transfer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissionTransfer {
    /// No mission transfer in progress
    #[default]
    Idle,
    /// Download in progress (Autopilot → GCS)
    Sending { peer: Peer },
    /// Upload in progress (GCS → Autopilot)
    Receiving {
        peer: Peer,
        /// Highest seq expected (number of mission commands)
        last_seq: u16,
        /// Next expected seq
        request_index: u16,
    },
}

/// Mission protocol handler
#[derive(Debug)]
pub struct MissionHandler {
    transfer: MissionTransfer,
    /// Most mission commands an upload may declare, home excluded
    capacity: u16,
    last_sent_us: u64,
    last_received_us: u64,
}

impl Default for MissionHandler {
    fn default() -> Self {
        Self::with_capacity(MAX_COMMANDS as u16)
    }
}

impl MissionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler accepting at most `capacity` commands, never more than the list holds
    pub fn with_capacity(capacity: u16) -> Self {
        Self {
            transfer: MissionTransfer::Idle,
            capacity: capacity.min(MAX_COMMANDS as u16),
            last_sent_us: 0,
            last_received_us: 0,
        }
    }

    pub fn transfer(&self) -> MissionTransfer {
        self.transfer
    }

    /// Whether a download is in progress
    pub fn is_sending(&self) -> bool {
        matches!(self.transfer, MissionTransfer::Sending { .. })
    }

    /// Whether an upload is in progress
    pub fn is_receiving(&self) -> bool {
        matches!(self.transfer, MissionTransfer::Receiving { .. })
    }

    /// Time the last mission item was sent
    pub fn last_sent_us(&self) -> u64 {
        self.last_sent_us
    }

    /// Time the last mission item was accepted
    pub fn last_received_us(&self) -> u64 {
        self.last_received_us
    }

    /// Abandon any transfer in progress
    pub fn reset(&mut self) {
        self.transfer = MissionTransfer::Idle;
    }

    /// Handle MISSION_REQUEST_LIST: start a download
    pub fn handle_request_list(
        &mut self,
        peer: Peer,
        mission: &CommandList,
        now_us: u64,
    ) -> MavMessage {
        crate::log_info!("Mission download requested");
        self.transfer = MissionTransfer::Sending { peer };
        self.last_sent_us = now_us;
        self.last_received_us = now_us;

        MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            count: mission.command_count() + 1,
            target_system: peer.system_id,
            target_component: peer.component_id,
            ..Default::default()
        })
    }

    /// Handle MISSION_REQUEST during a download
    pub fn handle_request(
        &mut self,
        data: &MISSION_REQUEST_DATA,
        mission: &CommandList,
        current_index: u16,
        now_us: u64,
    ) -> Option<MavMessage> {
        let MissionTransfer::Sending { peer } = self.transfer else {
            crate::log_debug!("MISSION_REQUEST {} while not downloading", data.seq);
            return None;
        };
        let Some(command) = mission.get(data.seq) else {
            crate::log_warn!("Mission item {} not found", data.seq);
            return None;
        };
        self.last_sent_us = now_us;
        match mission_item(
            command,
            data.seq,
            mission.home(),
            peer,
            data.seq == current_index,
        ) {
            Some(item) => Some(MavMessage::MISSION_ITEM(item)),
            None => {
                crate::log_warn!("Mission item {} has unknown command {}", data.seq, command.id);
                self.transfer = MissionTransfer::Idle;
                Some(mission_ack(peer, MavMissionResult::MAV_MISSION_UNSUPPORTED))
            }
        }
    }

    /// Handle MISSION_ACK: a download is finished
    pub fn handle_ack(&mut self) {
        if self.is_sending() {
            crate::log_info!("Mission download complete");
            self.transfer = MissionTransfer::Idle;
        }
    }

    /// Handle MISSION_COUNT: start an upload
    pub fn handle_count(
        &mut self,
        peer: Peer,
        count: u16,
        mission: &mut CommandList,
        params: &mut ParameterStore,
        now_us: u64,
    ) -> Option<MavMessage> {
        let count = count.min(self.capacity + 1);
        self.last_received_us = now_us;

        if count == 0 {
            mission.clear();
            set_command_total(params, 0);
            self.transfer = MissionTransfer::Idle;
            return Some(mission_ack(peer, MavMissionResult::MAV_MISSION_ACCEPTED));
        }

        let last_seq = count - 1;
        if let Err(e) = mission.resize(last_seq) {
            crate::log_error!("Mission resize to {} failed: {}", last_seq, e);
            return None;
        }
        set_command_total(params, last_seq);
        crate::log_info!("Mission upload started: {} items", count);

        self.transfer = MissionTransfer::Receiving {
            peer,
            last_seq,
            request_index: 0,
        };
        Some(mission_request(peer, 0))
    }

    /// Handle MISSION_ITEM during an upload.
    ///
    /// Returns the next MISSION_REQUEST, the final MISSION_ACK, or nothing
    /// when the item is not the one expected.
    pub fn handle_item(
        &mut self,
        data: &MISSION_ITEM_DATA,
        mission: &mut CommandList,
        now_us: u64,
    ) -> Option<MavMessage> {
        let MissionTransfer::Receiving {
            peer,
            last_seq,
            request_index,
        } = self.transfer
        else {
            return None;
        };

        if data.seq != request_index {
            crate::log_debug!(
                "Mission item out of order: expected {}, got {}",
                request_index,
                data.seq
            );
            return None;
        }

        if data.seq != 0 {
            let command = command_from_item(data, mission.home());
            if let Err(e) = mission.set(data.seq, command) {
                crate::log_warn!("Mission item {} not stored: {}", data.seq, e);
            }
        }
        self.last_received_us = now_us;

        let request_index = request_index + 1;
        if request_index > last_seq {
            crate::log_info!("Mission upload complete: {} commands", last_seq);
            self.transfer = MissionTransfer::Idle;
            return Some(mission_ack(peer, MavMissionResult::MAV_MISSION_ACCEPTED));
        }

        self.transfer = MissionTransfer::Receiving {
            peer,
            last_seq,
            request_index,
        };
        Some(mission_request(peer, request_index))
    }

    /// Re-request the expected item of an upload in progress
    pub fn request_commands(&self) -> Option<MavMessage> {
        match self.transfer {
            MissionTransfer::Receiving {
                peer,
                last_seq,
                request_index,
            } if request_index <= last_seq => Some(mission_request(peer, request_index)),
            _ => None,
        }
    }

    /// Handle MISSION_CLEAR_ALL: drop every command but home
    pub fn handle_clear_all(
        &mut self,
        peer: Peer,
        mission: &mut CommandList,
        params: &mut ParameterStore,
        guide: &mut Guide,
    ) -> Vec<MavMessage, CLEAR_ALL_ACKS> {
        crate::log_info!("Mission cleared");
        mission.clear();
        set_command_total(params, 0);
        guide.restart(mission);

        let mut messages = Vec::new();
        for _ in 0..CLEAR_ALL_ACKS {
            let _ = messages.push(mission_ack(peer, MavMissionResult::MAV_MISSION_ACCEPTED));
        }
        messages
    }

    /// Handle MISSION_SET_CURRENT: jump the guide, then report its index
    pub fn handle_set_current(
        &mut self,
        data: &MISSION_SET_CURRENT_DATA,
        mission: &CommandList,
        guide: &mut Guide,
    ) -> MavMessage {
        if let Err(e) = guide.set_current(mission, data.seq) {
            crate::log_warn!("MISSION_SET_CURRENT {} rejected: {}", data.seq, e);
        }
        MavMessage::MISSION_CURRENT(MISSION_CURRENT_DATA {
            seq: guide.cmd_index(),
            ..Default::default()
        })
    }
}

fn set_command_total(params: &mut ParameterStore, total: u16) {
    let total = i16::try_from(total).unwrap_or(i16::MAX);
    if let Err(e) = params.force_set("CMD_TOTAL", ParamValue::Int16(total)) {
        crate::log_warn!("CMD_TOTAL not updated: {}", e);
    }
}

fn mission_request(peer: Peer, seq: u16) -> MavMessage {
    MavMessage::MISSION_REQUEST(MISSION_REQUEST_DATA {
        seq,
        target_system: peer.system_id,
        target_component: peer.component_id,
        ..Default::default()
    })
}

fn mission_ack(peer: Peer, result: MavMissionResult) -> MavMessage {
    MavMessage::MISSION_ACK(MISSION_ACK_DATA {
        target_system: peer.system_id,
        target_component: peer.component_id,
        mavtype: result,
        ..Default::default()
    })
}

fn frame_from_wire(frame: MavFrame) -> Frame {
    match frame {
        MavFrame::MAV_FRAME_GLOBAL | MavFrame::MAV_FRAME_MISSION => Frame::Global,
        MavFrame::MAV_FRAME_GLOBAL_RELATIVE_ALT => Frame::GlobalRelativeAlt,
        MavFrame::MAV_FRAME_LOCAL_NED => Frame::LocalNed,
        other => {
            crate::log_warn!("Unsupported frame {}, treating as global", other as u8);
            Frame::Global
        }
    }
}

fn frame_to_wire(frame: Frame) -> MavFrame {
    match frame {
        Frame::Global => MavFrame::MAV_FRAME_GLOBAL,
        Frame::GlobalRelativeAlt => MavFrame::MAV_FRAME_GLOBAL_RELATIVE_ALT,
        Frame::LocalNed => MavFrame::MAV_FRAME_LOCAL_NED,
    }
}

/// Wire command for an on-board command id
fn mav_cmd(id: u16) -> Option<MavCmd> {
    MavCmd::from_u16(id)
}

fn command_from_item(data: &MISSION_ITEM_DATA, home: &Command) -> Command {
    let mut command = Command {
        id: data.command as u16,
        ..Command::default()
    };
    decode_position(
        &mut command,
        frame_from_wire(data.frame),
        WirePosition {
            x: data.x,
            y: data.y,
            z: data.z,
        },
        home,
    );
    from_wire(
        &mut command,
        [data.param1, data.param2, data.param3, data.param4],
    );
    command
}

fn mission_item(
    command: &Command,
    seq: u16,
    home: &Command,
    peer: Peer,
    current: bool,
) -> Option<MISSION_ITEM_DATA> {
    let command_id = mav_cmd(command.id)?;
    let (frame, pos) = encode_position(command, home);
    let [param1, param2, param3, param4] = to_wire(command);
    Some(MISSION_ITEM_DATA {
        param1,
        param2,
        param3,
        param4,
        x: pos.x,
        y: pos.y,
        z: pos.z,
        seq,
        command: command_id,
        target_system: peer.system_id,
        target_component: peer.component_id,
        frame: frame_to_wire(frame),
        current: current as u8,
        autocontinue: 1,
        ..Default::default()
    })
}
