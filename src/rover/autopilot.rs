//! Cooperative autopilot loop
//!
//! [`Autopilot`] owns every piece of vehicle state and runs them from one
//! loop, in a fixed order, each at its own rate:
//!
//! | Task                         | Rate      |
//! |------------------------------|-----------|
//! | navigation (fast) + control  | 50 Hz     |
//! | navigation (slow)            | 10 Hz     |
//! | guidance                     | 10 Hz     |
//! | link receive                 | each step |
//! | parameter stream + requests  | 10 Hz     |
//! | HEARTBEAT                    | 1 Hz      |
//! | ATTITUDE                     | 10 Hz     |
//! | GLOBAL_POSITION_INT          | 4 Hz      |
//! | RC_CHANNELS_SCALED           | 4 Hz      |
//!
//! Nothing blocks. The caller samples a clock and calls [`Autopilot::step`]
//! as often as it likes; tasks that are not due are skipped.

use crate::communication::mavlink::{
    ChannelRegistry, CommLink, LinkConfig, LinkContext, MessageKind, TelemetrySource,
};
use crate::platform::SerialChannel;
use apo_core::control::{CarChannels, CarController, ControlError, ControlMode};
use apo_core::guide::{Guide, ObstacleSensors};
use apo_core::hal::{RangeFinder, RcChannel};
use apo_core::mission::{Command, CommandList};
use apo_core::navigation::{Navigator, Setpoint};
use apo_core::parameters::{
    ControlParams, GuideParams, LinkParams, ParamPersistence, ParamValue, ParameterError,
    ParameterStore,
};
use apo_core::scheduler::{PeriodicTask, TaskMetadata};
use apo_core::traits::TimeSource;
use mavlink::common::MavSeverity;

/// Default time after which a silent mission transfer is abandoned (us)
pub const DEFAULT_TRANSFER_TIMEOUT_US: u64 = 5_000_000;

/// Errors building an [`Autopilot`]
#[derive(Debug, thiserror::Error)]
pub enum AutopilotError {
    #[error("parameter setup failed: {0}")]
    Parameters(ParameterError),

    #[error("controller setup failed: {0}")]
    Control(ControlError),
}

/// Autopilot construction settings
#[derive(Debug, Clone, Copy)]
pub struct AutopilotConfig {
    /// Mission index 0; every relative altitude is measured from it
    pub home: Command,
    /// Identity used by every link. `SYSID_THISMAV` overrides the system id.
    pub link: LinkConfig,
    /// Abandon a mission transfer after this long without traffic; 0 never does
    pub transfer_timeout_us: u64,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            home: Command::default(),
            link: LinkConfig::default(),
            transfer_timeout_us: DEFAULT_TRANSFER_TIMEOUT_US,
        }
    }
}

/// RC channels of a ground rover, in output order
#[derive(Debug, Clone)]
pub struct RoverChannels<R> {
    pub mode: R,
    pub steering: R,
    pub throttle: R,
}

impl<R: RcChannel> RoverChannels<R> {
    /// Normalized positions in channel order (mode, steering, throttle)
    pub fn positions(&self) -> [f32; 3] {
        [
            self.mode.position(),
            self.steering.position(),
            self.throttle.position(),
        ]
    }
}

struct Tasks {
    fast: PeriodicTask,
    slow: PeriodicTask,
    guide: PeriodicTask,
    link: PeriodicTask,
    heartbeat: PeriodicTask,
    attitude: PeriodicTask,
    location: PeriodicTask,
    servo: PeriodicTask,
}

impl Tasks {
    const fn new() -> Self {
        Self {
            fast: PeriodicTask::new(TaskMetadata::new("nav_fast", 50)),
            slow: PeriodicTask::new(TaskMetadata::new("nav_slow", 10)),
            guide: PeriodicTask::new(TaskMetadata::new("guide", 10)),
            link: PeriodicTask::new(TaskMetadata::new("link_service", 10)),
            heartbeat: PeriodicTask::new(TaskMetadata::new("heartbeat", 1)),
            attitude: PeriodicTask::new(TaskMetadata::new("attitude", 10)),
            location: PeriodicTask::new(TaskMetadata::new("location", 4)),
            servo: PeriodicTask::new(TaskMetadata::new("servo_out", 4)),
        }
    }
}

/// Ground-rover autopilot
pub struct Autopilot<N, R, F, P, C>
where
    N: Navigator,
    R: RcChannel,
    F: RangeFinder,
    P: ParamPersistence,
    C: SerialChannel,
{
    params: ParameterStore,
    storage: P,
    mission: CommandList,
    navigator: N,
    guide: Guide,
    controller: CarController,
    channels: RoverChannels<R>,
    range_finders: Vec<F>,
    registry: ChannelRegistry,
    links: Vec<CommLink<C>>,
    link_config: LinkConfig,
    transfer_timeout_us: u64,
    setpoint: Setpoint,
    mode: ControlMode,
    generation: u32,
    tasks: Tasks,
}

impl<N, R, F, P, C> Autopilot<N, R, F, P, C>
where
    N: Navigator,
    R: RcChannel,
    F: RangeFinder,
    P: ParamPersistence,
    C: SerialChannel,
{
    /// Register every parameter, load stored values and build the loops
    pub fn new(
        config: AutopilotConfig,
        navigator: N,
        channels: RoverChannels<R>,
        range_finders: Vec<F>,
        storage: P,
    ) -> Result<Self, AutopilotError> {
        let mut params = ParameterStore::new();
        GuideParams::register_defaults(&mut params).map_err(AutopilotError::Parameters)?;
        ControlParams::register_defaults(&mut params).map_err(AutopilotError::Parameters)?;
        LinkParams::register_defaults(&mut params).map_err(AutopilotError::Parameters)?;

        let loaded = params.load_all(&storage);
        crate::log_info!("Loaded {} stored parameters", loaded);
        // Commands live in memory only, so a stored total is stale
        params
            .force_set("CMD_TOTAL", ParamValue::Int16(0))
            .map_err(AutopilotError::Parameters)?;

        let mission = CommandList::new(config.home);
        let obstacles = ObstacleSensors::classify(range_finders.iter());
        crate::log_info!("{} obstacle sensors classified", obstacles.count());
        let guide = Guide::new(GuideParams::from_store(&params), &mission, obstacles);
        let controller = CarController::new(&ControlParams::from_store(&params))
            .map_err(AutopilotError::Control)?;

        let mut link_config = config.link;
        link_config.system_id = LinkParams::from_store(&params).system_id;

        Ok(Self {
            generation: params.generation(),
            params,
            storage,
            mission,
            navigator,
            guide,
            controller,
            channels,
            range_finders,
            registry: ChannelRegistry::new(),
            links: Vec::new(),
            link_config,
            transfer_timeout_us: config.transfer_timeout_us,
            setpoint: Setpoint::default(),
            mode: ControlMode::Manual,
            tasks: Tasks::new(),
        })
    }

    /// Attach a ground-station link. Returns whether it claimed a channel slot.
    pub fn add_link(&mut self, channel: C) -> bool {
        let link = CommLink::new(channel, self.link_config, &mut self.registry);
        let active = link.is_active();
        self.links.push(link);
        active
    }

    pub fn link_config(&self) -> &LinkConfig {
        &self.link_config
    }

    pub fn links(&self) -> &[CommLink<C>] {
        &self.links
    }

    pub fn link_mut(&mut self, index: usize) -> Option<&mut CommLink<C>> {
        self.links.get_mut(index)
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    pub fn mission(&self) -> &CommandList {
        &self.mission
    }

    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn channels(&self) -> &RoverChannels<R> {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut RoverChannels<R> {
        &mut self.channels
    }

    pub fn range_finders_mut(&mut self) -> &mut [F] {
        &mut self.range_finders
    }

    /// Setpoint from the last guidance tick
    pub fn setpoint(&self) -> &Setpoint {
        &self.setpoint
    }

    /// Mode selected on the last control tick
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Send operator text on every link
    pub fn send_text(&mut self, severity: MavSeverity, text: &str) {
        for link in &mut self.links {
            link.send_text(severity, text);
        }
    }

    /// Sample `time` once and run every due task
    pub fn run_once(&mut self, time: &impl TimeSource) {
        self.step(time.now_us());
    }

    /// Run every task due at `now_us`
    pub fn step(&mut self, now_us: u64) {
        if let Some(dt) = self.tasks.fast.poll(now_us) {
            self.navigator.update_fast(dt);
            self.control(dt);
        }

        if let Some(dt) = self.tasks.slow.poll(now_us) {
            self.navigator.update_slow(dt);
        }

        if self.tasks.guide.poll(now_us).is_some() {
            self.setpoint = self.guide.update(
                self.navigator.state(),
                &self.mission,
                self.range_finders.iter(),
            );
        }

        self.receive(now_us);
        self.reload_params();
        self.expire_transfers(now_us);

        if self.tasks.link.poll(now_us).is_some() {
            for link in &mut self.links {
                link.send_parameters(&self.params);
                link.request_commands();
            }
        }

        let kinds = [
            (self.tasks.heartbeat.poll(now_us), MessageKind::Heartbeat),
            (self.tasks.attitude.poll(now_us), MessageKind::Attitude),
            (self.tasks.location.poll(now_us), MessageKind::Location),
            (self.tasks.servo.poll(now_us), MessageKind::ServoOut),
        ];
        let outputs = self.channels.positions();
        let source = TelemetrySource {
            nav: self.navigator.state(),
            home: self.mission.home(),
            mode: self.mode,
            outputs: &outputs,
            now_us,
        };
        for (due, kind) in kinds {
            if due.is_some() {
                for link in &mut self.links {
                    link.send_message(kind, &source);
                }
            }
        }
    }

    fn control(&mut self, dt: f32) {
        let RoverChannels {
            mode,
            steering,
            throttle,
        } = &mut self.channels;
        let mode = self.controller.update(
            dt,
            self.navigator.state(),
            &self.setpoint,
            CarChannels {
                mode,
                steering,
                throttle,
            },
        );
        if mode != self.mode {
            crate::log_info!(
                "Control mode {}",
                if mode == ControlMode::Auto { "AUTO" } else { "MANUAL" }
            );
        }
        self.mode = mode;
    }

    fn receive(&mut self, now_us: u64) {
        let rc_manual = self.channels.mode.position() > 0.0;
        let mut ctx = LinkContext {
            params: &mut self.params,
            storage: &mut self.storage,
            mission: &mut self.mission,
            guide: &mut self.guide,
            navigator: &mut self.navigator,
            rc_manual,
            now_us,
        };
        for link in &mut self.links {
            link.receive(&mut ctx);
        }
    }

    /// Push changed parameters into the guide, controller and links
    fn reload_params(&mut self) {
        let generation = self.params.generation();
        if generation == self.generation {
            return;
        }
        self.generation = generation;

        self.guide.set_params(GuideParams::from_store(&self.params));
        self.controller
            .apply_params(&ControlParams::from_store(&self.params));
        let system_id = LinkParams::from_store(&self.params).system_id;
        self.link_config.system_id = system_id;
        for link in &mut self.links {
            link.set_system_id(system_id);
        }
        crate::log_debug!("Parameters reloaded (generation {})", generation);
    }

    fn expire_transfers(&mut self, now_us: u64) {
        if self.transfer_timeout_us == 0 {
            return;
        }
        for link in &mut self.links {
            let mission = link.mission();
            if !mission.is_sending() && !mission.is_receiving() {
                continue;
            }
            let last = mission.last_sent_us().max(mission.last_received_us());
            if now_us.saturating_sub(last) > self.transfer_timeout_us {
                crate::log_warn!("Mission transfer timed out");
                link.reset_transfers();
            }
        }
    }
}
