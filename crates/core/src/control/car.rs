//! Ground-rover controller
//!
//! Reads the mode channel every tick. A positive mode position (or the
//! `CNTRL_MODE` override) selects manual: the pilot's radio PWM passes
//! straight through to steering and throttle. Otherwise two block chains
//! run:
//!
//! - steering: `SumGain(heading error) -> PID-DFB(yaw rate) -> Sink(raw) -> Saturate(+-1) -> Output`
//! - throttle: `SumGain(speed error) -> PID -> Saturate(+-1) -> Output`

use super::block::{BlockChain, BlockId, Signal};
use super::error::ControlError;
use crate::geo::wrap_pi;
use crate::hal::RcChannel;
use crate::navigation::{NavState, Setpoint};
use crate::parameters::ControlParams;

/// Actuator slot driven by the steering chain
pub const CH_STEERING: usize = 1;
/// Actuator slot driven by the throttle chain
pub const CH_THROTTLE: usize = 2;

/// Controller mode selected on the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Manual,
    Auto,
}

/// RC channels the car controller reads and drives
pub struct CarChannels<'a> {
    pub mode: &'a mut dyn RcChannel,
    pub steering: &'a mut dyn RcChannel,
    pub throttle: &'a mut dyn RcChannel,
}

struct SteeringLoop {
    chain: BlockChain,
    heading_error: Signal,
    yaw_rate: Signal,
    raw: Signal,
    pid: BlockId,
}

impl SteeringLoop {
    fn new(params: &ControlParams) -> Result<Self, ControlError> {
        let mut chain = BlockChain::new();
        let heading_error = chain.signal(0.0)?;
        let yaw_rate = chain.signal(0.0)?;
        let raw = chain.signal(0.0)?;
        let one = chain.signal(1.0)?;
        let negative_one = chain.signal(-1.0)?;

        chain.add_sum_gain(&[(heading_error, one)])?;
        let pid = chain.add_pid_dfb(params.steering, yaw_rate)?;
        chain.add_sink(raw)?;
        chain.add_saturate(negative_one, one)?;
        chain.add_output(CH_STEERING)?;

        Ok(Self {
            chain,
            heading_error,
            yaw_rate,
            raw,
            pid,
        })
    }
}

struct ThrottleLoop {
    chain: BlockChain,
    speed_error: Signal,
    pid: BlockId,
}

impl ThrottleLoop {
    fn new(params: &ControlParams) -> Result<Self, ControlError> {
        let mut chain = BlockChain::new();
        let speed_error = chain.signal(0.0)?;
        let one = chain.signal(1.0)?;
        let negative_one = chain.signal(-1.0)?;

        chain.add_sum_gain(&[(speed_error, one)])?;
        let pid = chain.add_pid(params.throttle)?;
        chain.add_saturate(negative_one, one)?;
        chain.add_output(CH_THROTTLE)?;

        Ok(Self {
            chain,
            speed_error,
            pid,
        })
    }
}

/// Car controller
pub struct CarController {
    steering: SteeringLoop,
    throttle: ThrottleLoop,
    force_manual: bool,
    mode: ControlMode,
}

impl CarController {
    pub fn new(params: &ControlParams) -> Result<Self, ControlError> {
        Ok(Self {
            steering: SteeringLoop::new(params)?,
            throttle: ThrottleLoop::new(params)?,
            force_manual: params.force_manual,
            mode: ControlMode::Manual,
        })
    }

    /// Apply reloaded parameters, keeping integrator state
    pub fn apply_params(&mut self, params: &ControlParams) {
        self.steering
            .chain
            .set_gains(self.steering.pid, params.steering);
        self.throttle
            .chain
            .set_gains(self.throttle.pid, params.throttle);
        self.force_manual = params.force_manual;
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Steering command before saturation on the last auto tick
    pub fn steering_raw(&self) -> f32 {
        self.steering.chain.get(self.steering.raw)
    }

    /// Run one control tick
    pub fn update(
        &mut self,
        dt: f32,
        nav: &NavState,
        setpoint: &Setpoint,
        channels: CarChannels<'_>,
    ) -> ControlMode {
        let CarChannels {
            mode,
            steering,
            throttle,
        } = channels;

        mode.set_pwm(mode.read_radio());
        if self.force_manual || mode.position() > 0.0 {
            steering.set_pwm(steering.read_radio());
            throttle.set_pwm(throttle.read_radio());
            self.mode = ControlMode::Manual;
            return self.mode;
        }

        if self.mode == ControlMode::Manual {
            self.steering.chain.reset();
            self.throttle.chain.reset();
        }
        self.mode = ControlMode::Auto;

        let heading_error = wrap_pi(setpoint.heading - nav.heading);
        self.steering
            .chain
            .set(self.steering.heading_error, heading_error);
        self.steering.chain.set(self.steering.yaw_rate, nav.yaw_rate);
        self.steering.chain.update(dt);

        let speed_error = setpoint.ground_speed - nav.ground_speed;
        self.throttle
            .chain
            .set(self.throttle.speed_error, speed_error);
        self.throttle.chain.update(dt);

        if let Some(position) = self.steering.chain.actuator(CH_STEERING) {
            steering.set_position(position);
        }
        if let Some(position) = self.throttle.chain.actuator(CH_THROTTLE) {
            throttle.set_position(position);
        }
        self.mode
    }
}
