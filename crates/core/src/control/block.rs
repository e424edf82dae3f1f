//! Block chain
//!
//! A control loop is an ordered chain of blocks evaluated once per tick in
//! registration order. Every value a block reads or writes lives in a signal
//! arena owned by the chain: external inputs and tunable limits are signals
//! allocated up front, and each block's output is a signal allocated when
//! the block is added.
//!
//! Adding a block wires the outputs of the previous block to the new block's
//! inputs, after any explicit inputs the block was created with. The wiring is
//! fixed for the life of the chain. A block whose required input is missing
//! does nothing on update, so a misconfigured chain yields zero output
//! instead of faulting.

use super::error::ControlError;
use super::pid::{Pid, PidDfb};
use crate::parameters::PidGains;
use heapless::Vec;

/// Maximum blocks per chain
pub const MAX_BLOCKS: usize = 16;

/// Maximum signals per chain
pub const MAX_SIGNALS: usize = 64;

/// Maximum input ports per block
pub const MAX_PORTS: usize = 8;

/// Number of actuator positions a chain can drive
pub const MAX_ACTUATORS: usize = 8;

/// Handle to a value in a chain's signal arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal(usize);

/// Handle to a block in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId(usize);

/// Block kinds and their per-kind state
#[derive(Debug, Clone)]
pub enum BlockKind {
    /// Sum of `input[i] * gain[i]` over the configured pairs
    SumGain { gains: Vec<Signal, MAX_PORTS> },
    /// Filtered-derivative PID on input 0
    Pid(Pid),
    /// Derivative-feedback PID on input 0 with a measured rate
    PidDfb { pid: PidDfb, derivative: Signal },
    /// Clamp input `port` to `[min, max]`
    Saturate { min: Signal, max: Signal, port: usize },
    /// Copy input `port` into `target`, which is also exposed as the output
    Sink { target: Signal, port: usize },
    /// Copy input 0 into an actuator position
    Output { channel: usize },
}

/// One node in the chain
#[derive(Debug, Clone)]
pub struct Block {
    kind: BlockKind,
    inputs: Vec<Signal, MAX_PORTS>,
    outputs: Vec<Signal, 1>,
}

impl Block {
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn inputs(&self) -> &[Signal] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Signal] {
        &self.outputs
    }

    fn update(&mut self, signals: &mut [f32], actuators: &mut [Option<f32>], dt: f32) {
        let inputs = &self.inputs;
        let read = |port: usize, signals: &[f32]| inputs.get(port).map(|s| signals[s.0]);

        let value = match &mut self.kind {
            BlockKind::SumGain { gains } => Some(
                inputs
                    .iter()
                    .zip(gains.iter())
                    .map(|(input, gain)| signals[input.0] * signals[gain.0])
                    .sum::<f32>(),
            ),
            BlockKind::Pid(pid) => read(0, signals).map(|u| pid.update(u, dt)),
            BlockKind::PidDfb { pid, derivative } => {
                let rate = signals[derivative.0];
                read(0, signals).map(|u| pid.update(u, rate, dt))
            }
            BlockKind::Saturate { min, max, port } => {
                let (lo, hi) = (signals[min.0], signals[max.0]);
                read(*port, signals).map(|mut u| {
                    if u > hi {
                        u = hi;
                    }
                    if u < lo {
                        u = lo;
                    }
                    u
                })
            }
            BlockKind::Sink { target, port } => {
                if let Some(u) = read(*port, signals) {
                    signals[target.0] = u;
                }
                None
            }
            BlockKind::Output { channel } => {
                if let Some(u) = read(0, signals) {
                    actuators[*channel] = Some(u);
                }
                None
            }
        };

        if let (Some(value), Some(out)) = (value, self.outputs.first()) {
            signals[out.0] = value;
        }
    }

    fn reset(&mut self) {
        match &mut self.kind {
            BlockKind::Pid(pid) => pid.reset(),
            BlockKind::PidDfb { pid, .. } => pid.reset(),
            _ => {}
        }
    }
}

/// Ordered chain of blocks over a signal arena
#[derive(Debug, Clone)]
pub struct BlockChain {
    signals: Vec<f32, MAX_SIGNALS>,
    blocks: Vec<Block, MAX_BLOCKS>,
    actuators: [Option<f32>; MAX_ACTUATORS],
}

impl BlockChain {
    pub fn new() -> Self {
        Self {
            signals: Vec::new(),
            blocks: Vec::new(),
            actuators: [None; MAX_ACTUATORS],
        }
    }

    /// Allocate an externally driven signal
    pub fn signal(&mut self, initial: f32) -> Result<Signal, ControlError> {
        let index = self.signals.len();
        self.signals
            .push(initial)
            .map_err(|_| ControlError::SignalCapacity)?;
        Ok(Signal(index))
    }

    pub fn set(&mut self, signal: Signal, value: f32) {
        if let Some(slot) = self.signals.get_mut(signal.0) {
            *slot = value;
        }
    }

    pub fn get(&self, signal: Signal) -> f32 {
        self.signals.get(signal.0).copied().unwrap_or(0.0)
    }

    /// Gain-sum over `(value, gain)` pairs
    pub fn add_sum_gain(&mut self, pairs: &[(Signal, Signal)]) -> Result<BlockId, ControlError> {
        let mut inputs = Vec::new();
        let mut gains = Vec::new();
        for (value, gain) in pairs {
            self.check(*value)?;
            self.check(*gain)?;
            inputs.push(*value).map_err(|_| ControlError::PortCapacity)?;
            gains.push(*gain).map_err(|_| ControlError::PortCapacity)?;
        }
        self.add(BlockKind::SumGain { gains }, inputs, true)
    }

    pub fn add_pid(&mut self, gains: PidGains) -> Result<BlockId, ControlError> {
        self.add(BlockKind::Pid(Pid::new(gains)), Vec::new(), true)
    }

    pub fn add_pid_dfb(&mut self, gains: PidGains, derivative: Signal) -> Result<BlockId, ControlError> {
        self.check(derivative)?;
        let kind = BlockKind::PidDfb {
            pid: PidDfb::new(gains),
            derivative,
        };
        self.add(kind, Vec::new(), true)
    }

    pub fn add_saturate(&mut self, min: Signal, max: Signal) -> Result<BlockId, ControlError> {
        self.check(min)?;
        self.check(max)?;
        self.add(BlockKind::Saturate { min, max, port: 0 }, Vec::new(), true)
    }

    pub fn add_sink(&mut self, target: Signal) -> Result<BlockId, ControlError> {
        self.check(target)?;
        let id = self.add(BlockKind::Sink { target, port: 0 }, Vec::new(), false)?;
        // the sink re-exports its target so the chain can continue past it
        if let Some(block) = self.blocks.last_mut() {
            let _ = block.outputs.push(target);
        }
        Ok(id)
    }

    pub fn add_output(&mut self, channel: usize) -> Result<BlockId, ControlError> {
        if channel >= MAX_ACTUATORS {
            return Err(ControlError::InvalidIndex);
        }
        self.add(BlockKind::Output { channel }, Vec::new(), false)
    }

    fn check(&self, signal: Signal) -> Result<(), ControlError> {
        if signal.0 < self.signals.len() {
            Ok(())
        } else {
            Err(ControlError::InvalidIndex)
        }
    }

    fn add(
        &mut self,
        kind: BlockKind,
        mut inputs: Vec<Signal, MAX_PORTS>,
        has_output: bool,
    ) -> Result<BlockId, ControlError> {
        if self.blocks.is_full() {
            return Err(ControlError::BlockCapacity);
        }
        if let Some(previous) = self.blocks.last() {
            inputs
                .extend_from_slice(&previous.outputs)
                .map_err(|_| ControlError::PortCapacity)?;
        }
        let mut outputs = Vec::new();
        if has_output {
            let out = self.signal(0.0)?;
            let _ = outputs.push(out);
        }
        let id = BlockId(self.blocks.len());
        self.blocks
            .push(Block {
                kind,
                inputs,
                outputs,
            })
            .map_err(|_| ControlError::BlockCapacity)?;
        Ok(id)
    }

    /// Run every block once, in registration order
    pub fn update(&mut self, dt: f32) {
        for block in self.blocks.iter_mut() {
            block.update(&mut self.signals, &mut self.actuators, dt);
        }
    }

    /// Reset compensator state in every block
    pub fn reset(&mut self) {
        for block in self.blocks.iter_mut() {
            block.reset();
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    /// Value of a block's output, if it has one
    pub fn output(&self, id: BlockId) -> Option<f32> {
        let block = self.blocks.get(id.0)?;
        block.outputs.first().map(|s| self.signals[s.0])
    }

    /// Replace the gains of a PID or PID-DFB block, keeping its state
    pub fn set_gains(&mut self, id: BlockId, gains: PidGains) {
        match self.blocks.get_mut(id.0).map(|b| &mut b.kind) {
            Some(BlockKind::Pid(pid)) => pid.set_gains(gains),
            Some(BlockKind::PidDfb { pid, .. }) => pid.set_gains(gains),
            _ => {}
        }
    }

    /// Last position written to actuator `channel`, if any block drove it
    pub fn actuator(&self, channel: usize) -> Option<f32> {
        self.actuators.get(channel).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for BlockChain {
    fn default() -> Self {
        Self::new()
    }
}
