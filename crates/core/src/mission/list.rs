//! Mission command list
//!
//! Index 0 is always home. Mission commands occupy indices `1..=command_count()`.

use super::command::Command;
use super::error::MissionError;
use heapless::Vec;

/// Maximum number of mission commands, excluding home
pub const MAX_COMMANDS: usize = 200;

/// Fixed-capacity mission list with home at index 0
#[derive(Debug, Clone)]
pub struct CommandList {
    commands: Vec<Command, { MAX_COMMANDS + 1 }>,
}

impl CommandList {
    /// Create a list holding only `home`
    pub fn new(home: Command) -> Self {
        let mut commands = Vec::new();
        // capacity is at least one
        let _ = commands.push(home);
        Self { commands }
    }

    pub fn home(&self) -> &Command {
        &self.commands[0]
    }

    pub fn set_home(&mut self, home: Command) {
        self.commands[0] = home;
    }

    /// Command at `index`, where 0 is home
    pub fn get(&self, index: u16) -> Option<&Command> {
        self.commands.get(index as usize)
    }

    /// Replace the mission command at `index` (1-based)
    pub fn set(&mut self, index: u16, command: Command) -> Result<(), MissionError> {
        if index == 0 {
            return Err(MissionError::HomeProtected);
        }
        let slot = self
            .commands
            .get_mut(index as usize)
            .ok_or(MissionError::IndexOutOfRange)?;
        *slot = command;
        Ok(())
    }

    /// Resize to `count` mission commands.
    ///
    /// New slots are filled with copies of home so an incomplete upload
    /// never leaves the vehicle heading for (0, 0).
    pub fn resize(&mut self, count: u16) -> Result<(), MissionError> {
        if count as usize > MAX_COMMANDS {
            return Err(MissionError::CapacityExceeded);
        }
        let home = *self.home();
        self.commands
            .resize(count as usize + 1, home)
            .map_err(|_| MissionError::CapacityExceeded)
    }

    /// Remove every mission command, keeping home
    pub fn clear(&mut self) {
        self.commands.truncate(1);
    }

    /// Number of mission commands, excluding home
    pub fn command_count(&self) -> u16 {
        (self.commands.len() - 1) as u16
    }

    /// All commands, home first
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

impl Default for CommandList {
    fn default() -> Self {
        Self::new(Command::default())
    }
}
