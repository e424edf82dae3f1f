//! Obstacle override
//!
//! Range finders are sorted into front/back/left/right once, by their
//! orientation vector, and remembered by position in the sensor list.
//! Sensors pointing any other way are ignored.

use crate::hal::{Orientation, RangeFinder};

/// Distance below which a classified sensor stops the vehicle (m)
pub const OBSTACLE_THRESHOLD_M: f32 = 0.3;

/// Positions of the directional sensors within the range-finder list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObstacleSensors {
    front: Option<usize>,
    back: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

impl ObstacleSensors {
    /// Classify sensors by orientation. The last sensor facing a direction wins.
    pub fn classify<'a, I, R>(finders: I) -> Self
    where
        I: IntoIterator<Item = &'a R>,
        R: RangeFinder + ?Sized + 'a,
    {
        let mut sensors = Self::default();
        for (index, finder) in finders.into_iter().enumerate() {
            match finder.orientation() {
                Orientation::FRONT => sensors.front = Some(index),
                Orientation::BACK => sensors.back = Some(index),
                Orientation::LEFT => sensors.left = Some(index),
                Orientation::RIGHT => sensors.right = Some(index),
                _ => {}
            }
        }
        sensors
    }

    /// Number of classified sensors
    pub fn count(&self) -> usize {
        [self.front, self.back, self.left, self.right]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }

    /// True if any classified sensor currently reads below the threshold
    pub fn blocked<'a, I, R>(&self, finders: I) -> bool
    where
        I: IntoIterator<Item = &'a R>,
        R: RangeFinder + ?Sized + 'a,
    {
        let watched = [self.front, self.back, self.left, self.right];
        finders.into_iter().enumerate().any(|(index, finder)| {
            watched.contains(&Some(index)) && finder.distance() < OBSTACLE_THRESHOLD_M
        })
    }
}
