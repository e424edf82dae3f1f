//! Time abstraction for the cooperative autopilot loop
//!
//! The loop never reads a clock itself. A `TimeSource` is sampled once per
//! step and the timestamp is passed down explicitly, so host tests can drive
//! time deterministically with [`MockTime`].

use core::cell::Cell;

/// Monotonic time source
///
/// # Example
///
/// ```
/// use apo_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance(20_000);
/// assert_eq!(time.now_us(), 20_000);
/// assert_eq!(time.now_ms(), 20);
/// ```
pub trait TimeSource {
    /// Microseconds since system start
    fn now_us(&self) -> u64;

    /// Milliseconds since system start
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Microseconds elapsed since `reference_us`, saturating at zero
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Manually advanced time source for tests and simulation
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
