//! Range finders
//!
//! Each sensor reports a distance and a fixed body-frame orientation unit
//! vector. The guide classifies sensors into front/back/left/right once by
//! that vector.

/// Body-frame unit vector `[x, y, z]` (x forward, y right, z down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation(pub [i8; 3]);

impl Orientation {
    pub const FRONT: Self = Self([1, 0, 0]);
    pub const BACK: Self = Self([-1, 0, 0]);
    pub const RIGHT: Self = Self([0, 1, 0]);
    pub const LEFT: Self = Self([0, -1, 0]);
}

/// Distance sensor
pub trait RangeFinder {
    /// Latest distance reading (m)
    fn distance(&self) -> f32;

    /// Mounting orientation
    fn orientation(&self) -> Orientation;
}
