//! apo_core - Pure no_std control and guidance logic for the apo autopilot
//!
//! This crate contains the platform-agnostic pieces of the autopilot so they
//! can be tested on the host without any feature flags or I/O.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies, no allocation
//! - **Trait abstractions**: RC channels, range finders, persistence and time are injected
//!
//! # Modules
//!
//! - [`parameters`]: Parameter store, persistence trait and typed parameter groups
//! - [`hal`]: RC channel and range-finder traits consumed by the controller and guide
//! - [`navigation`]: Navigation state snapshot, setpoint and the `Navigator` trait
//! - [`mission`]: Mission command list, reference frames and wire parameter remapping
//! - [`geo`]: Spherical-earth distance, bearing and track geometry
//! - [`control`]: Block chain, PID compensators and the car controller
//! - [`guide`]: Waypoint sequencer with cross-track correction and obstacle override
//! - [`scheduler`]: Rate gates for the cooperative autopilot loop
//! - [`traits`]: Time source abstraction

#![no_std]

pub mod control;
pub mod geo;
pub mod guide;
pub mod hal;
pub mod mission;
pub mod navigation;
pub mod parameters;
pub mod scheduler;
pub mod traits;
