//! MAVLink message writer
//!
//! Serializes outgoing messages as MAVLink 2 frames with this vehicle's
//! system/component ids and a wrapping sequence number, and writes them to
//! a serial channel.

use super::LinkError;
use crate::platform::SerialChannel;
use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::io::Cursor;
use std::vec::Vec;

/// Largest MAVLink 2 frame, including signature
pub const MAX_FRAME_LEN: usize = 280;

/// Writer statistics for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Total messages successfully sent
    pub messages_sent: u32,
    /// Messages that failed to encode or write
    pub send_failures: u32,
}

/// MAVLink message writer
pub struct MavlinkWriter {
    system_id: u8,
    component_id: u8,
    sequence: u8,
    stats: WriterStats,
}

impl MavlinkWriter {
    /// Create a new MAVLink writer
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
            stats: WriterStats::default(),
        }
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Sequence number the next message will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn set_system_id(&mut self, system_id: u8) {
        self.system_id = system_id;
    }

    /// Encode one message into a MAVLink 2 frame
    pub fn encode(&mut self, message: &MavMessage) -> Result<Vec<u8>, LinkError> {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);

        let mut buf = Cursor::new(Vec::with_capacity(MAX_FRAME_LEN));
        mavlink::write_v2_msg(&mut buf, header, message)
            .map_err(|e| LinkError::Encode(format!("{e:?}")))?;
        Ok(buf.into_inner())
    }

    /// Encode and write one message
    pub fn write<C: SerialChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        message: &MavMessage,
    ) -> Result<(), LinkError> {
        let result = self
            .encode(message)
            .and_then(|frame| channel.write_all(&frame).map_err(LinkError::from));
        match result {
            Ok(()) => self.stats.messages_sent += 1,
            Err(_) => self.stats.send_failures += 1,
        }
        result
    }
}
