//! Cooperative rate scheduling for the autopilot loop
//!
//! The autopilot runs every task from one loop. Each task owns a
//! [`PeriodicTask`] that decides, from the caller's clock, whether it is due
//! and how much time elapsed since it last ran.
//!
//! # Example
//!
//! ```rust
//! use apo_core::scheduler::{PeriodicTask, TaskMetadata};
//!
//! let mut control = PeriodicTask::new(TaskMetadata::new("control", 50));
//! assert!(control.poll(0).is_some());
//! assert!(control.poll(10_000).is_none());
//! assert_eq!(control.poll(20_000), Some(0.02));
//! ```

pub mod types;

pub use types::*;
