//! Shared helpers for link and autopilot integration tests
//!
//! `Gcs` plays the ground station: it frames messages the way a real GCS
//! does and decodes everything the vehicle wrote back.

#![allow(dead_code)]

use apo::communication::mavlink::{ChannelRegistry, CommLink, LinkConfig, LinkContext};
use apo::platform::mock::{MemoryStorage, MockSerial};
use apo_core::guide::{Guide, ObstacleSensors};
use apo_core::mission::{Command, CommandList};
use apo_core::navigation::HilNavigator;
use apo_core::parameters::{ControlParams, GuideParams, LinkParams, ParameterStore};
use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;
use std::io::Cursor;

pub const GCS_SYSTEM: u8 = 255;
pub const GCS_COMPONENT: u8 = 190;

/// Home used by every fixture: Zurich, 488 m
pub fn home() -> Command {
    Command::waypoint(473_977_000, 85_455_000, 48_800, 0.0)
}

/// Ground-station side of a link
#[derive(Default)]
pub struct Gcs {
    sequence: u8,
}

impl Gcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame one message as MAVLink 2
    pub fn frame(&mut self, message: &MavMessage) -> Vec<u8> {
        let header = MavHeader {
            system_id: GCS_SYSTEM,
            component_id: GCS_COMPONENT,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);
        let mut buf = Cursor::new(Vec::new());
        mavlink::write_v2_msg(&mut buf, header, message).expect("encode");
        buf.into_inner()
    }

    /// Queue `message` on the vehicle's receive side
    pub fn send(&mut self, serial: &mut MockSerial, message: MavMessage) {
        let bytes = self.frame(&message);
        serial.inject_rx_data(&bytes);
    }
}

/// Decode every frame the vehicle wrote and clear its transmit buffer
pub fn replies(serial: &mut MockSerial) -> Vec<(MavHeader, MavMessage)> {
    let mut reader = PeekReader::new(Cursor::new(serial.take_tx()));
    let mut out = Vec::new();
    while let Ok(frame) = mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
        out.push(frame);
    }
    out
}

/// Vehicle state a bare link operates on
pub struct Vehicle {
    pub params: ParameterStore,
    pub storage: MemoryStorage,
    pub mission: CommandList,
    pub guide: Guide,
    pub navigator: HilNavigator,
}

impl Vehicle {
    pub fn new() -> Self {
        let mut params = ParameterStore::new();
        GuideParams::register_defaults(&mut params).expect("guide params");
        ControlParams::register_defaults(&mut params).expect("control params");
        LinkParams::register_defaults(&mut params).expect("link params");
        let mission = CommandList::new(home());
        let guide = Guide::new(
            GuideParams::from_store(&params),
            &mission,
            ObstacleSensors::default(),
        );
        Self {
            params,
            storage: MemoryStorage::new(),
            mission,
            guide,
            navigator: HilNavigator::default(),
        }
    }

    pub fn context(&mut self, now_us: u64) -> LinkContext<'_> {
        LinkContext {
            params: &mut self.params,
            storage: &mut self.storage,
            mission: &mut self.mission,
            guide: &mut self.guide,
            navigator: &mut self.navigator,
            rc_manual: false,
            now_us,
        }
    }
}

/// Link on a fresh registry with the default identity (system 1, component 1)
pub fn link() -> CommLink<MockSerial> {
    let mut registry = ChannelRegistry::new();
    CommLink::new(MockSerial::new(), LinkConfig::default(), &mut registry)
}
