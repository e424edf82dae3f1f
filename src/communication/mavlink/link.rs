//! Ground-station link
//!
//! [`CommLink`] owns one serial channel and answers everything that arrives
//! on it. Reception is a pull loop: [`CommLink::receive`] drains the bytes
//! buffered on the channel, parses every complete frame and dispatches each
//! message synchronously. Corrupt frames are counted and dropped.
//!
//! Outbound telemetry is sent on request through [`CommLink::send_message`];
//! the link keeps no timers of its own.
//!
//! Targeted messages are accepted only when their target system matches this
//! vehicle. A target component that differs (other than the broadcast id 0)
//! is reported with a STATUSTEXT and the message is still handled.

use super::handlers::{
    hil, telemetry, CommandHandler, CommandTarget, MissionHandler, ParamHandler, Peer,
};
use super::parser::MavlinkParser;
use super::registry::{ChannelId, ChannelRegistry};
use super::writer::MavlinkWriter;
use crate::platform::SerialChannel;
use apo_core::control::ControlMode;
use apo_core::guide::Guide;
use apo_core::mission::{Command, CommandList, MAX_COMMANDS};
use apo_core::navigation::{NavState, Navigator};
use apo_core::parameters::{ParamPersistence, ParameterStore};
use heapless::Vec;
use mavlink::common::{MavMessage, MavSeverity, MavType};
use mavlink::{MavHeader, Message};

/// Bytes read from the channel per parser pass
const READ_CHUNK: usize = 64;

/// Most replies a single incoming message can produce
const MAX_RESPONSES: usize = 4;

/// Component id meaning "every component"
const COMPONENT_BROADCAST: u8 = 0;

type Responses = Vec<MavMessage, MAX_RESPONSES>;

/// Link identity and limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    pub system_id: u8,
    pub component_id: u8,
    /// Vehicle type reported in HEARTBEAT
    pub vehicle: MavType,
    /// Most mission commands accepted on upload
    pub cmd_max: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            system_id: 1,
            component_id: 1,
            vehicle: MavType::MAV_TYPE_GROUND_ROVER,
            cmd_max: MAX_COMMANDS as u16,
        }
    }
}

/// Outbound periodic message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Heartbeat,
    Attitude,
    Location,
    ServoOut,
}

/// Link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub packets_received: u32,
    pub packets_dropped: u32,
    pub messages_sent: u32,
    pub send_failures: u32,
}

/// Vehicle state incoming messages may read or change
pub struct LinkContext<'a> {
    pub params: &'a mut ParameterStore,
    pub storage: &'a mut dyn ParamPersistence,
    pub mission: &'a mut CommandList,
    pub guide: &'a mut Guide,
    pub navigator: &'a mut dyn Navigator,
    /// RC mode switch currently selects manual
    pub rc_manual: bool,
    pub now_us: u64,
}

/// Vehicle state outbound telemetry is built from
#[derive(Clone, Copy)]
pub struct TelemetrySource<'a> {
    pub nav: &'a NavState,
    pub home: &'a Command,
    pub mode: ControlMode,
    /// Normalized actuator positions, in channel order
    pub outputs: &'a [f32],
    pub now_us: u64,
}

/// MAVLink link over one serial channel
pub struct CommLink<C: SerialChannel> {
    channel: C,
    id: Option<ChannelId>,
    config: LinkConfig,
    parser: MavlinkParser,
    writer: MavlinkWriter,
    params: ParamHandler,
    mission: MissionHandler,
    commands: CommandHandler,
}

impl<C: SerialChannel> CommLink<C> {
    /// Create a link, claiming a slot from `registry`.
    ///
    /// When every slot is taken the link is built inert: it never reads
    /// from or writes to its channel.
    pub fn new(channel: C, config: LinkConfig, registry: &mut ChannelRegistry) -> Self {
        let id = registry.claim();
        if let Some(id) = id {
            crate::log_info!(
                "Link {} active (system {}, component {})",
                id.index(),
                config.system_id,
                config.component_id
            );
        }
        Self {
            channel,
            id,
            config,
            parser: MavlinkParser::new(),
            writer: MavlinkWriter::new(config.system_id, config.component_id),
            params: ParamHandler::new(),
            mission: MissionHandler::with_capacity(config.cmd_max),
            commands: CommandHandler::new(),
        }
    }

    /// Whether this link claimed a slot
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.id
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Mission transfer state, including its last-sent/last-received times
    pub fn mission(&self) -> &MissionHandler {
        &self.mission
    }

    /// Abandon any mission transfer and parameter stream in progress
    pub fn reset_transfers(&mut self) {
        self.mission.reset();
        self.params = ParamHandler::new();
    }

    pub fn is_streaming_params(&self) -> bool {
        self.params.is_streaming()
    }

    pub fn set_system_id(&mut self, system_id: u8) {
        if system_id != self.config.system_id {
            crate::log_info!("System id changed to {}", system_id);
        }
        self.config.system_id = system_id;
        self.writer.set_system_id(system_id);
    }

    pub fn stats(&self) -> LinkStats {
        let parser = self.parser.stats();
        let writer = self.writer.stats();
        LinkStats {
            packets_received: parser.messages_received,
            packets_dropped: parser.packets_dropped,
            messages_sent: writer.messages_sent,
            send_failures: writer.send_failures,
        }
    }

    /// Drain the channel and handle every complete message
    pub fn receive(&mut self, ctx: &mut LinkContext<'_>) {
        if self.id.is_none() {
            return;
        }

        let mut buf = [0u8; READ_CHUNK];
        loop {
            if self.channel.available() == 0 {
                break;
            }
            let n = match self.channel.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    crate::log_warn!("Link read failed: {}", e);
                    break;
                }
            };
            self.parser.push_bytes(&buf[..n]);
            self.process_pending(ctx);
        }
    }

    fn process_pending(&mut self, ctx: &mut LinkContext<'_>) {
        while let Some((header, message)) = self.parser.next_message() {
            let responses = self.dispatch(&header, &message, ctx);
            for response in &responses {
                self.send(response);
            }
        }
    }

    /// Route one message to its handler and collect the replies
    fn dispatch(
        &mut self,
        header: &MavHeader,
        message: &MavMessage,
        ctx: &mut LinkContext<'_>,
    ) -> Responses {
        use mavlink::common::MavMessage::*;

        let peer = Peer {
            system_id: header.system_id,
            component_id: header.component_id,
        };
        let mut responses = Responses::new();

        match message {
            HEARTBEAT(_) => {
                crate::log_trace!("Heartbeat from system {}", header.system_id);
            }

            // HIL sensor input
            ATTITUDE(data) => {
                hil::apply_attitude(ctx.navigator, data, ctx.now_us);
            }
            GPS_RAW_INT(data) => {
                hil::apply_gps(ctx.navigator, data, ctx.now_us);
            }

            // Parameter protocol
            PARAM_REQUEST_LIST(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    self.params.handle_request_list();
                }
            }
            PARAM_REQUEST_READ(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    push(&mut responses, self.params.handle_request_read(data, ctx.params));
                }
            }
            PARAM_SET(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let reply = self.params.handle_set(data, ctx.params, ctx.storage);
                    push(&mut responses, reply);
                }
            }

            // Command protocol
            COMMAND_LONG(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let target = CommandTarget {
                        params: &mut *ctx.params,
                        storage: &mut *ctx.storage,
                        mission: &*ctx.mission,
                        guide: &mut *ctx.guide,
                        rc_manual: ctx.rc_manual,
                    };
                    let ack = self.commands.handle_command_long(data, target);
                    push(&mut responses, Some(ack));
                }
            }

            // Mission protocol
            MISSION_REQUEST_LIST(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let count = self
                        .mission
                        .handle_request_list(peer, ctx.mission, ctx.now_us);
                    push(&mut responses, Some(count));
                }
            }
            MISSION_REQUEST(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let item = self.mission.handle_request(
                        data,
                        ctx.mission,
                        ctx.guide.cmd_index(),
                        ctx.now_us,
                    );
                    push(&mut responses, item);
                }
            }
            MISSION_ACK(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    self.mission.handle_ack();
                }
            }
            MISSION_COUNT(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let reply = self.mission.handle_count(
                        peer,
                        data.count,
                        ctx.mission,
                        ctx.params,
                        ctx.now_us,
                    );
                    push(&mut responses, reply);
                }
            }
            MISSION_ITEM(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let reply = self.mission.handle_item(data, ctx.mission, ctx.now_us);
                    push(&mut responses, reply);
                }
            }
            MISSION_CLEAR_ALL(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let acks =
                        self.mission
                            .handle_clear_all(peer, ctx.mission, ctx.params, ctx.guide);
                    for ack in acks {
                        push(&mut responses, Some(ack));
                    }
                }
            }
            MISSION_SET_CURRENT(data) => {
                if self.check_target(data.target_system, data.target_component, &mut responses) {
                    let current = self
                        .mission
                        .handle_set_current(data, ctx.mission, ctx.guide);
                    push(&mut responses, Some(current));
                }
            }

            _ => {
                crate::log_trace!("Unhandled message id {}", message.message_id());
            }
        }

        responses
    }

    /// Accept a targeted message when its system matches.
    ///
    /// A component mismatch only queues a STATUSTEXT.
    fn check_target(
        &self,
        target_system: u8,
        target_component: u8,
        responses: &mut Responses,
    ) -> bool {
        if target_system != self.config.system_id {
            crate::log_debug!(
                "Ignoring message for system {} (this is {})",
                target_system,
                self.config.system_id
            );
            return false;
        }
        if target_component != self.config.component_id && target_component != COMPONENT_BROADCAST
        {
            crate::log_debug!("Component id mismatch: {}", target_component);
            push(
                responses,
                Some(telemetry::status_text(
                    MavSeverity::MAV_SEVERITY_WARNING,
                    "component id mismatch",
                )),
            );
        }
        true
    }

    /// Send one periodic message built from `source`
    pub fn send_message(&mut self, kind: MessageKind, source: &TelemetrySource<'_>) {
        if self.id.is_none() {
            return;
        }
        let message = match kind {
            MessageKind::Heartbeat => telemetry::heartbeat(self.config.vehicle, source.mode),
            MessageKind::Attitude => telemetry::attitude(source.nav, source.now_us),
            MessageKind::Location => {
                telemetry::global_position(source.nav, source.home, source.now_us)
            }
            MessageKind::ServoOut => telemetry::rc_channels_scaled(source.outputs, source.now_us),
        };
        self.send(&message);
    }

    /// Stream the next parameter of a PARAM_REQUEST_LIST, if one is pending
    pub fn send_parameters(&mut self, params: &ParameterStore) {
        if self.id.is_none() {
            return;
        }
        if let Some(value) = self.params.next_value(params) {
            self.send(&value);
        }
    }

    /// Re-request the expected item of an upload in progress
    pub fn request_commands(&mut self) {
        if self.id.is_none() {
            return;
        }
        if let Some(request) = self.mission.request_commands() {
            self.send(&request);
        }
    }

    /// Send operator text
    pub fn send_text(&mut self, severity: MavSeverity, text: &str) {
        self.send(&telemetry::status_text(severity, text));
    }

    fn send(&mut self, message: &MavMessage) {
        if self.id.is_none() {
            return;
        }
        if let Err(e) = self.writer.write(&mut self.channel, message) {
            crate::log_warn!("Link send failed: {}", e);
        }
    }
}

fn push(responses: &mut Responses, message: Option<MavMessage>) {
    if let Some(message) = message {
        if responses.push(message).is_err() {
            crate::log_warn!("Response queue full, reply dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MemoryStorage, MockSerial};
    use apo_core::guide::ObstacleSensors;
    use apo_core::navigation::HilNavigator;
    use apo_core::parameters::{ControlParams, GuideParams, LinkParams};
    use mavlink::common::{
        MavCmd, COMMAND_LONG_DATA, HEARTBEAT_DATA, MISSION_COUNT_DATA, PARAM_REQUEST_LIST_DATA,
    };
    use mavlink::peek_reader::PeekReader;
    use std::io::Cursor;

    struct Vehicle {
        params: ParameterStore,
        storage: MemoryStorage,
        mission: CommandList,
        guide: Guide,
        navigator: HilNavigator,
    }

    impl Vehicle {
        fn new() -> Self {
            let mut params = ParameterStore::new();
            GuideParams::register_defaults(&mut params).unwrap();
            ControlParams::register_defaults(&mut params).unwrap();
            LinkParams::register_defaults(&mut params).unwrap();
            let mission = CommandList::new(Command::waypoint(0, 0, 0, 0.0));
            let guide = Guide::new(GuideParams::default(), &mission, ObstacleSensors::default());
            Self {
                params,
                storage: MemoryStorage::new(),
                mission,
                guide,
                navigator: HilNavigator::default(),
            }
        }

        fn context(&mut self) -> LinkContext<'_> {
            LinkContext {
                params: &mut self.params,
                storage: &mut self.storage,
                mission: &mut self.mission,
                guide: &mut self.guide,
                navigator: &mut self.navigator,
                rc_manual: false,
                now_us: 0,
            }
        }
    }

    fn frame(message: &MavMessage) -> std::vec::Vec<u8> {
        let header = MavHeader {
            system_id: 255,
            component_id: 190,
            sequence: 0,
        };
        let mut buf = Cursor::new(std::vec::Vec::new());
        mavlink::write_v2_msg(&mut buf, header, message).unwrap();
        buf.into_inner()
    }

    fn sent(link: &mut CommLink<MockSerial>) -> std::vec::Vec<MavMessage> {
        let tx = link.channel_mut().take_tx();
        let mut reader = PeekReader::new(Cursor::new(tx));
        let mut out = std::vec::Vec::new();
        while let Ok((_, msg)) = mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
            out.push(msg);
        }
        out
    }

    fn active_link() -> CommLink<MockSerial> {
        let mut registry = ChannelRegistry::new();
        CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry)
    }

    fn mission_count(target_system: u8, target_component: u8, count: u16) -> MavMessage {
        MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            count,
            target_system,
            target_component,
            ..Default::default()
        })
    }

    #[test]
    fn test_mission_count_gets_request() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&mission_count(1, 1, 3)));
        link.receive(&mut vehicle.context());

        let replies = sent(&mut link);
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], MavMessage::MISSION_REQUEST(ref d) if d.seq == 0));
        assert!(link.mission().is_receiving());
        assert_eq!(link.stats().packets_received, 1);
    }

    #[test]
    fn test_wrong_system_fully_ignored() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&mission_count(7, 1, 3)));
        link.receive(&mut vehicle.context());

        assert!(sent(&mut link).is_empty());
        assert!(!link.mission().is_receiving());
        assert_eq!(vehicle.mission.command_count(), 0);
    }

    #[test]
    fn test_wrong_component_still_processed() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&mission_count(1, 42, 3)));
        link.receive(&mut vehicle.context());

        let replies = sent(&mut link);
        assert!(matches!(replies[0], MavMessage::STATUSTEXT(_)));
        assert!(matches!(replies[1], MavMessage::MISSION_REQUEST(_)));
        assert!(link.mission().is_receiving());
        assert_eq!(vehicle.mission.command_count(), 2);
    }

    #[test]
    fn test_broadcast_component_accepted_quietly() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&MavMessage::PARAM_REQUEST_LIST(
                PARAM_REQUEST_LIST_DATA {
                    target_system: 1,
                    target_component: 0,
                },
            )));
        link.receive(&mut vehicle.context());
        assert!(sent(&mut link).is_empty());
        assert!(link.is_streaming_params());

        link.send_parameters(&vehicle.params);
        let replies = sent(&mut link);
        assert!(matches!(replies[0], MavMessage::PARAM_VALUE(ref d) if d.param_index == 0));
    }

    #[test]
    fn test_command_long_acked() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
                command: MavCmd::MAV_CMD_DO_SET_MODE,
                param1: 1.0,
                param2: telemetry::CUSTOM_MODE_MANUAL as f32,
                target_system: 1,
                target_component: 1,
                ..Default::default()
            })));
        link.receive(&mut vehicle.context());

        let replies = sent(&mut link);
        assert!(matches!(replies[0], MavMessage::COMMAND_ACK(ref d)
            if d.command == MavCmd::MAV_CMD_DO_SET_MODE));
        assert!(ControlParams::from_store(&vehicle.params).force_manual);
    }

    #[test]
    fn test_corrupt_frame_counted() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        let mut bytes = frame(&mission_count(1, 1, 3));
        let last = bytes.len() - 1;
        bytes[last - 1] = 0;
        bytes[last] = 0;
        link.channel_mut().inject_rx_data(&bytes);
        link.receive(&mut vehicle.context());

        assert!(sent(&mut link).is_empty());
        assert_eq!(link.stats().packets_dropped, 1);
        assert_eq!(link.stats().packets_received, 0);
    }

    #[test]
    fn test_excess_link_is_inert() {
        let mut vehicle = Vehicle::new();
        let mut registry = ChannelRegistry::new();
        let _a = CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry);
        let _b = CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry);
        let mut extra = CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry);
        assert!(!extra.is_active());

        let bytes = frame(&mission_count(1, 1, 3));
        extra.channel_mut().inject_rx_data(&bytes);
        extra.receive(&mut vehicle.context());
        extra.send_message(
            MessageKind::Heartbeat,
            &TelemetrySource {
                nav: &NavState::default(),
                home: &Command::default(),
                mode: ControlMode::Manual,
                outputs: &[],
                now_us: 0,
            },
        );
        extra.send_text(MavSeverity::MAV_SEVERITY_INFO, "hello");

        assert!(extra.channel().tx_buffer().is_empty());
        assert_eq!(extra.channel().available(), bytes.len());
        assert_eq!(extra.stats(), LinkStats::default());
    }

    #[test]
    fn test_send_message_kinds() {
        let mut link = active_link();
        let nav = NavState::default();
        let home = Command::default();
        let source = TelemetrySource {
            nav: &nav,
            home: &home,
            mode: ControlMode::Auto,
            outputs: &[0.25, -0.5],
            now_us: 1_000_000,
        };
        for kind in [
            MessageKind::Heartbeat,
            MessageKind::Attitude,
            MessageKind::Location,
            MessageKind::ServoOut,
        ] {
            link.send_message(kind, &source);
        }

        let replies = sent(&mut link);
        assert_eq!(replies.len(), 4);
        assert!(matches!(replies[0], MavMessage::HEARTBEAT(ref d)
            if d.custom_mode == telemetry::CUSTOM_MODE_AUTO));
        assert!(matches!(replies[3], MavMessage::RC_CHANNELS_SCALED(ref d)
            if d.chan1_scaled == 2500 && d.chan2_scaled == -5000));
        assert_eq!(link.stats().messages_sent, 4);
    }

    #[test]
    fn test_send_failure_counted() {
        let mut link = active_link();
        link.channel_mut().close();
        link.send_text(MavSeverity::MAV_SEVERITY_INFO, "lost");
        assert_eq!(link.stats().send_failures, 1);
    }

    #[test]
    fn test_heartbeat_in_ignored() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.channel_mut()
            .inject_rx_data(&frame(&MavMessage::HEARTBEAT(HEARTBEAT_DATA::default())));
        link.receive(&mut vehicle.context());
        assert!(sent(&mut link).is_empty());
        assert_eq!(link.stats().packets_received, 1);
    }

    #[test]
    fn test_set_system_id_retargets() {
        let mut vehicle = Vehicle::new();
        let mut link = active_link();
        link.set_system_id(9);
        link.channel_mut()
            .inject_rx_data(&frame(&mission_count(9, 1, 2)));
        link.receive(&mut vehicle.context());
        assert!(link.mission().is_receiving());
    }
}
