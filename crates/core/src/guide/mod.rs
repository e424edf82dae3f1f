//! Guide / mission sequencer
//!
//! Walks the mission list one leg at a time. A leg runs from `prev` to
//! `next`, both copied out of the list so an upload in progress never moves
//! the active leg. The mission index is circular over `[0, command_count]`:
//! after the last command the guide heads home and repeats the mission.
//!
//! Each update:
//!
//! 1. Handles the active command (NAV_WAYPOINT advances once the vehicle is
//!    inside its acceptance radius; DO_CHANGE_SPEED applies its `p2` speed; any
//!    other id is skipped).
//! 2. Commands the leg bearing plus a cross-track correction clamped to
//!    `+-pi/2`.
//! 3. Zeroes both speed commands while any directional range finder reads
//!    below the obstacle threshold. The override does not latch.

pub mod obstacle;

pub use obstacle::{ObstacleSensors, OBSTACLE_THRESHOLD_M};

use crate::geo::{self, wrap_pi};
use crate::hal::RangeFinder;
use crate::mission::command::{MAV_CMD_DO_CHANGE_SPEED, MAV_CMD_NAV_WAYPOINT};
use crate::mission::{Command, CommandList, MissionError};
use crate::navigation::{NavState, Setpoint};
use crate::parameters::GuideParams;
use core::f32::consts::FRAC_PI_2;

/// Waypoint sequencer
#[derive(Debug, Clone)]
pub struct Guide {
    params: GuideParams,
    cmd_index: u16,
    prev: Command,
    next: Command,
    speed_override: Option<f32>,
    obstacles: ObstacleSensors,
    obstacle_active: bool,
    setpoint: Setpoint,
}

impl Guide {
    /// Start on the leg from home to the first mission command
    pub fn new(params: GuideParams, mission: &CommandList, obstacles: ObstacleSensors) -> Self {
        let mut guide = Self {
            params,
            cmd_index: 0,
            prev: *mission.home(),
            next: *mission.home(),
            speed_override: None,
            obstacles,
            obstacle_active: false,
            setpoint: Setpoint::default(),
        };
        guide.restart(mission);
        guide
    }

    pub fn set_params(&mut self, params: GuideParams) {
        self.params = params;
    }

    /// Index of the command currently steered toward
    pub fn cmd_index(&self) -> u16 {
        self.cmd_index
    }

    pub fn prev_command(&self) -> &Command {
        &self.prev
    }

    pub fn next_command_target(&self) -> &Command {
        &self.next
    }

    pub fn setpoint(&self) -> &Setpoint {
        &self.setpoint
    }

    pub fn obstacle_active(&self) -> bool {
        self.obstacle_active
    }

    /// Restart the mission from home toward command 1
    pub fn restart(&mut self, mission: &CommandList) {
        self.speed_override = None;
        let start = if mission.command_count() > 0 { 1 } else { 0 };
        self.jump(mission, start);
    }

    /// Make `index` the active command, with the leg starting at the command before it
    pub fn set_current(&mut self, mission: &CommandList, index: u16) -> Result<(), MissionError> {
        if index > mission.command_count() {
            return Err(MissionError::IndexOutOfRange);
        }
        self.jump(mission, index);
        Ok(())
    }

    /// Head home from wherever the vehicle is going now
    pub fn return_home(&mut self, mission: &CommandList) {
        self.prev = self.next;
        self.cmd_index = 0;
        self.next = *mission.home();
    }

    fn jump(&mut self, mission: &CommandList, index: u16) {
        let home = *mission.home();
        self.prev = if index == 0 {
            home
        } else {
            mission.get(index - 1).copied().unwrap_or(home)
        };
        self.cmd_index = index;
        self.next = mission.get(index).copied().unwrap_or(home);
    }

    /// Advance to the following command, wrapping to home after the last
    pub fn next_command(&mut self, mission: &CommandList) {
        self.prev = self.next;
        self.cmd_index = if self.cmd_index >= mission.command_count() {
            0
        } else {
            self.cmd_index + 1
        };
        self.next = mission
            .get(self.cmd_index)
            .copied()
            .unwrap_or(*mission.home());
    }

    /// Act on the active command; advances at most once per call
    pub fn handle_command(&mut self, nav: &NavState, mission: &CommandList) {
        match self.next.id {
            MAV_CMD_NAV_WAYPOINT => {
                let radius = if self.next.radius() > 0.0 {
                    self.next.radius()
                } else {
                    self.params.wp_radius
                };
                if self.next.distance_to(nav.lat, nav.lon) < radius {
                    self.next_command(mission);
                }
            }
            MAV_CMD_DO_CHANGE_SPEED => {
                let speed = self.next.p2;
                if speed > 0.0 {
                    self.speed_override = Some(speed);
                }
                self.next_command(mission);
            }
            _ => self.next_command(mission),
        }
    }

    /// Signed distance (m) from the active leg; positive right of track
    pub fn cross_track(&self, nav: &NavState) -> f32 {
        let (lat, lon) = (nav.lat_rad(), nav.lon_rad());
        let (prev_lat, prev_lon) = (self.prev.lat_rad(), self.prev.lng_rad());
        let d = geo::distance(prev_lat, prev_lon, lat, lon);
        let b_current = geo::bearing(prev_lat, prev_lon, lat, lon);
        let b_next = geo::bearing(prev_lat, prev_lon, self.next.lat_rad(), self.next.lng_rad());
        geo::cross_track(d, b_current, b_next) as f32
    }

    /// Distance (m) travelled along the active leg
    pub fn along_track(&self, nav: &NavState) -> f32 {
        let d = geo::distance(
            self.prev.lat_rad(),
            self.prev.lng_rad(),
            nav.lat_rad(),
            nav.lon_rad(),
        );
        geo::along_track(d, self.cross_track(nav) as f64) as f32
    }

    /// Run one guidance tick and return the new setpoint
    pub fn update<'a, I, R>(&mut self, nav: &NavState, mission: &CommandList, finders: I) -> Setpoint
    where
        I: IntoIterator<Item = &'a R>,
        R: RangeFinder + ?Sized + 'a,
    {
        self.handle_command(nav, mission);

        let correction = (-self.params.xtrack_gain * self.cross_track(nav)).clamp(-FRAC_PI_2, FRAC_PI_2);
        let leg_bearing = self.prev.bearing_to_command(&self.next);
        let (p_n, p_e, p_d) = mission.home().ned_of(self.next.lat, self.next.lng, self.next.alt);

        let mut setpoint = Setpoint {
            heading: wrap_pi(leg_bearing + correction),
            air_speed: self.params.air_speed,
            ground_speed: self.speed_override.unwrap_or(self.params.cruise_speed),
            altitude: self.next.alt_m(),
            p_n,
            p_e,
            p_d,
        };

        self.obstacle_active = self.obstacles.blocked(finders);
        if self.obstacle_active {
            setpoint.air_speed = 0.0;
            setpoint.ground_speed = 0.0;
        }

        self.setpoint = setpoint;
        setpoint
    }
}
