//! RC input and actuator output channels
//!
//! A channel carries both directions: `read_radio` returns the pilot's PWM
//! input, `set_pwm`/`set_position` command the output. Positions are
//! normalized to `[-1.0, 1.0]` with 0.0 at the neutral pulse width.

/// RC/actuator channel
pub trait RcChannel {
    /// Current output position, normalized
    fn position(&self) -> f32;

    /// Command a normalized output position (clamped to `[-1.0, 1.0]`)
    fn set_position(&mut self, position: f32);

    /// Pulse width received from the radio (us)
    fn read_radio(&self) -> u16;

    /// Command a raw output pulse width (us)
    fn set_pwm(&mut self, pwm: u16);

    /// Current output pulse width (us)
    fn pwm(&self) -> u16;
}

/// Pulse-width calibration of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcCalibration {
    pub min: u16,
    pub neutral: u16,
    pub max: u16,
}

impl RcCalibration {
    pub const fn new(min: u16, neutral: u16, max: u16) -> Self {
        Self { min, neutral, max }
    }

    /// Pulse width to normalized position.
    ///
    /// Each side of neutral is scaled separately so asymmetric ranges still
    /// map their end points to exactly -1.0 and 1.0.
    pub fn pwm_to_position(&self, pwm: u16) -> f32 {
        let pwm = pwm.clamp(self.min, self.max) as f32;
        let neutral = self.neutral as f32;
        if pwm >= neutral {
            let span = (self.max as f32 - neutral).max(1.0);
            (pwm - neutral) / span
        } else {
            let span = (neutral - self.min as f32).max(1.0);
            (pwm - neutral) / span
        }
    }

    /// Normalized position to pulse width
    pub fn position_to_pwm(&self, position: f32) -> u16 {
        let position = if position.is_finite() {
            position.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let neutral = self.neutral as f32;
        let pwm = if position >= 0.0 {
            neutral + position * (self.max as f32 - neutral)
        } else {
            neutral + position * (neutral - self.min as f32)
        };
        libm::roundf(pwm) as u16
    }
}

impl Default for RcCalibration {
    fn default() -> Self {
        Self::new(1100, 1500, 1900)
    }
}
