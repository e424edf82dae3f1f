//! Channel registry
//!
//! The autopilot serves at most [`MAX_CHANNELS`] ground-station links. Each
//! link claims a slot from a [`ChannelRegistry`] when it is built; a link
//! that finds the registry exhausted is created disabled, and its send and
//! receive calls do nothing.

/// Maximum number of concurrently active links
pub const MAX_CHANNELS: usize = 2;

/// Slot claimed by an active link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId(u8);

impl ChannelId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Hands out link slots up to [`MAX_CHANNELS`]
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    claimed: u8,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next free slot, or `None` once the limit is reached
    pub fn claim(&mut self) -> Option<ChannelId> {
        if self.claimed as usize >= MAX_CHANNELS {
            crate::log_warn!("Channel limit ({}) reached, link disabled", MAX_CHANNELS);
            return None;
        }
        let id = ChannelId(self.claimed);
        self.claimed += 1;
        Some(id)
    }

    /// Number of slots handed out
    pub fn claimed(&self) -> usize {
        self.claimed as usize
    }
}
