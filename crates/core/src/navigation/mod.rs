//! Navigation state and the `Navigator` interface
//!
//! The attitude/position estimator is external. The core consumes it through
//! [`Navigator`], which is updated at a fast and a slow cadence and exposes a
//! read-only [`NavState`] snapshot each cycle.

mod types;

pub use types::{NavState, Setpoint};

/// Navigation state provider
pub trait Navigator {
    /// Fast-rate update (attitude and rates)
    fn update_fast(&mut self, dt: f32);

    /// Slow-rate update (position and velocity)
    fn update_slow(&mut self, dt: f32);

    /// Current state snapshot
    fn state(&self) -> &NavState;

    /// Mutable state for hardware-in-the-loop injection.
    ///
    /// Navigators backed by real sensors return `None` and ignore HIL input.
    fn hil_state(&mut self) -> Option<&mut NavState> {
        None
    }
}

/// Navigator whose state is injected externally (hardware-in-the-loop)
#[derive(Debug, Clone, Default)]
pub struct HilNavigator {
    state: NavState,
}

impl HilNavigator {
    pub fn new(state: NavState) -> Self {
        Self { state }
    }
}

impl Navigator for HilNavigator {
    fn update_fast(&mut self, _dt: f32) {}

    fn update_slow(&mut self, _dt: f32) {}

    fn state(&self) -> &NavState {
        &self.state
    }

    fn hil_state(&mut self) -> Option<&mut NavState> {
        Some(&mut self.state)
    }
}
