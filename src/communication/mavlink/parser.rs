//! MAVLink frame parser
//!
//! Accumulates raw serial bytes and yields complete messages. Both MAVLink
//! 1 (`0xFE`) and MAVLink 2 (`0xFD`) framing are accepted; decoding and CRC
//! checks are done by rust-mavlink on one isolated frame at a time.
//!
//! A frame that fails to decode (bad CRC, unknown message id, truncated
//! payload) is counted as dropped and the scan resumes one byte after its
//! start marker, so a false marker inside line noise cannot hide a real
//! frame behind it.

use heapless::Vec;
use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;
use std::io::Cursor;

/// Maximum size of receive buffer (bytes)
pub const RX_BUFFER_SIZE: usize = 512;

const MAGIC_V1: u8 = 0xFE;
const MAGIC_V2: u8 = 0xFD;
const HEADER_LEN_V1: usize = 6;
const HEADER_LEN_V2: usize = 10;
const CHECKSUM_LEN: usize = 2;
const SIGNATURE_LEN: usize = 13;
const INCOMPAT_FLAG_SIGNED: u8 = 0x01;

/// Parser statistics for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Total messages successfully parsed
    pub messages_received: u32,
    /// Frames that failed to decode
    pub packets_dropped: u32,
    /// Bytes discarded because the buffer was full
    pub buffer_overflows: u32,
}

/// Streaming MAVLink parser
pub struct MavlinkParser {
    rx_buffer: Vec<u8, RX_BUFFER_SIZE>,
    stats: ParserStats,
}

impl MavlinkParser {
    /// Create a new MAVLink parser
    pub fn new() -> Self {
        Self {
            rx_buffer: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    /// Get parser statistics
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Reset parser statistics
    pub fn reset_stats(&mut self) {
        self.stats = ParserStats::default();
    }

    /// Bytes waiting for the rest of their frame
    pub fn pending(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Append received bytes.
    ///
    /// When the buffer is full the oldest byte is discarded.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.rx_buffer.is_full() {
                self.discard(1);
                self.stats.buffer_overflows += 1;
            }
            // room was made above
            let _ = self.rx_buffer.push(byte);
        }
    }

    /// Extract the next complete message, if one is buffered
    pub fn next_message(&mut self) -> Option<(MavHeader, MavMessage)> {
        loop {
            let Some(start) = self
                .rx_buffer
                .iter()
                .position(|&b| b == MAGIC_V1 || b == MAGIC_V2)
            else {
                self.rx_buffer.clear();
                return None;
            };
            self.discard(start);

            let frame_len = self.frame_len()?;
            if self.rx_buffer.len() < frame_len {
                return None;
            }

            match decode_frame(&self.rx_buffer[..frame_len]) {
                Some(message) => {
                    self.discard(frame_len);
                    self.stats.messages_received += 1;
                    return Some(message);
                }
                None => {
                    crate::log_debug!("Dropped MAVLink frame ({} bytes)", frame_len);
                    self.stats.packets_dropped += 1;
                    self.discard(1);
                }
            }
        }
    }

    /// Full length of the frame at the head of the buffer, once its header is in
    fn frame_len(&self) -> Option<usize> {
        let buf = &self.rx_buffer;
        match buf.first()? {
            &MAGIC_V2 => {
                if buf.len() < HEADER_LEN_V2 {
                    return None;
                }
                let payload = buf[1] as usize;
                let signature = if buf[2] & INCOMPAT_FLAG_SIGNED != 0 {
                    SIGNATURE_LEN
                } else {
                    0
                };
                Some(HEADER_LEN_V2 + payload + CHECKSUM_LEN + signature)
            }
            _ => {
                if buf.len() < HEADER_LEN_V1 {
                    return None;
                }
                Some(HEADER_LEN_V1 + buf[1] as usize + CHECKSUM_LEN)
            }
        }
    }

    fn discard(&mut self, count: usize) {
        let count = count.min(self.rx_buffer.len());
        if count == 0 {
            return;
        }
        self.rx_buffer.copy_within(count.., 0);
        let remaining = self.rx_buffer.len() - count;
        self.rx_buffer.truncate(remaining);
    }
}

impl Default for MavlinkParser {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_frame(frame: &[u8]) -> Option<(MavHeader, MavMessage)> {
    let mut reader = PeekReader::new(Cursor::new(frame));
    let result = if frame[0] == MAGIC_V2 {
        mavlink::read_v2_msg::<MavMessage, _>(&mut reader)
    } else {
        mavlink::read_v1_msg::<MavMessage, _>(&mut reader)
    };
    result.ok()
}
