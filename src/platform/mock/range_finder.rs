//! Mock range finder for testing

use apo_core::hal::{Orientation, RangeFinder};

/// Range finder with a fixed orientation and a settable reading
#[derive(Debug, Clone, Copy)]
pub struct MockRangeFinder {
    orientation: Orientation,
    distance: f32,
}

impl MockRangeFinder {
    pub fn new(orientation: Orientation, distance: f32) -> Self {
        Self {
            orientation,
            distance,
        }
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }
}

impl RangeFinder for MockRangeFinder {
    fn distance(&self) -> f32 {
        self.distance
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}
