//! PID compensators
//!
//! Both variants share proportional and integral handling. They differ in the
//! derivative term:
//!
//! - [`Pid`] low-pass filters the change in its input
//!   (`RC = 1/(2*pi*f_cut)`, blend `dt/(dt+RC)`).
//! - [`PidDfb`] takes a measured rate (e.g. gyro yaw rate) and subtracts it.
//!
//! The integrator is clamped to `[-i_max, i_max]` and held there; the output
//! is clamped to `[-y_max, y_max]`.

use crate::parameters::PidGains;
use core::f32::consts::PI;

/// Error terms carried between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    /// Proportional error (last input)
    pub e_p: f32,
    /// Integral of the error
    pub e_i: f32,
    /// Filtered derivative of the error
    pub e_d: f32,
}

fn limit(value: f32, max: f32) -> f32 {
    if value > max {
        max
    } else if value < -max {
        -max
    } else {
        value
    }
}

/// Filtered-derivative PID
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    state: PidState,
    output: f32,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            state: PidState::default(),
            output: 0.0,
        }
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Replace gains, keeping the accumulated state
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn reset(&mut self) {
        self.state = PidState::default();
        self.output = 0.0;
    }

    /// Advance one tick. A non-positive `dt` leaves state and output unchanged.
    pub fn update(&mut self, input: f32, dt: f32) -> f32 {
        if !(dt > 0.0) {
            return self.output;
        }
        let g = &self.gains;
        let s = &mut self.state;

        // derivative reads the previous e_p, so it must run first
        if g.f_cut > 0.0 {
            let rc = 1.0 / (2.0 * PI * g.f_cut);
            s.e_d += ((s.e_p - input) / dt - s.e_d) * (dt / (dt + rc));
        }
        s.e_p = input;
        s.e_i = limit(s.e_i + s.e_p * dt, g.i_max);

        let y = g.kp * s.e_p + g.ki * s.e_i + g.kd * s.e_d;
        self.output = limit(y, g.y_max);
        self.output
    }
}

/// PID with derivative feedback from a measured rate
#[derive(Debug, Clone)]
pub struct PidDfb {
    gains: PidGains,
    state: PidState,
    output: f32,
}

impl PidDfb {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            state: PidState::default(),
            output: 0.0,
        }
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn reset(&mut self) {
        self.state = PidState::default();
        self.output = 0.0;
    }

    /// Advance one tick with the measured `derivative`.
    /// A non-positive `dt` leaves state and output unchanged.
    pub fn update(&mut self, input: f32, derivative: f32, dt: f32) -> f32 {
        if !(dt > 0.0) {
            return self.output;
        }
        let g = &self.gains;
        let s = &mut self.state;

        s.e_p = input;
        s.e_i = limit(s.e_i + s.e_p * dt, g.i_max);

        let y = g.kp * s.e_p + g.ki * s.e_i - g.kd * derivative;
        self.output = limit(y, g.y_max);
        self.output
    }
}
