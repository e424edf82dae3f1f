//! Mock RC channel for testing

use apo_core::hal::{RcCalibration, RcChannel};

/// RC channel with a settable radio input and a recorded output PWM
#[derive(Debug, Clone, Copy)]
pub struct MockRcChannel {
    calibration: RcCalibration,
    radio: u16,
    pwm: u16,
}

impl MockRcChannel {
    /// Create a channel whose radio input reads `radio`
    pub fn new(radio: u16) -> Self {
        Self::with_calibration(radio, RcCalibration::default())
    }

    pub fn with_calibration(radio: u16, calibration: RcCalibration) -> Self {
        Self {
            calibration,
            radio,
            pwm: calibration.neutral,
        }
    }

    /// Change the pilot's stick input
    pub fn set_radio(&mut self, radio: u16) {
        self.radio = radio;
    }
}

impl RcChannel for MockRcChannel {
    fn position(&self) -> f32 {
        self.calibration.pwm_to_position(self.pwm)
    }

    fn set_position(&mut self, position: f32) {
        self.pwm = self.calibration.position_to_pwm(position);
    }

    fn read_radio(&self) -> u16 {
        self.radio
    }

    fn set_pwm(&mut self, pwm: u16) {
        self.pwm = pwm;
    }

    fn pwm(&self) -> u16 {
        self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trips_through_pwm() {
        let mut channel = MockRcChannel::new(1500);
        channel.set_position(1.0);
        assert_eq!(channel.pwm(), 1900);
        assert!((channel.position() - 1.0).abs() < 1e-6);
        channel.set_position(-0.5);
        assert_eq!(channel.pwm(), 1300);
    }
}
