//! 2-D locations and the distance metric used by the cost model

use serde::{Deserialize, Serialize};

/// A point in the continuous simulation plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Move towards `target` by at most `step` meters.
    ///
    /// Returns the new location and whether `target` was reached.
    pub fn step_towards(&self, target: &Location, step: f64) -> (Location, bool) {
        let remaining = self.distance(target);
        if remaining <= step {
            return (*target, true);
        }
        let ratio = step / remaining;
        let next = Location::new(
            self.x + (target.x - self.x) * ratio,
            self.y + (target.y - self.y) * ratio,
        );
        (next, false)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Distance function consumed by the insertion cost model.
///
/// Implementations must return non-negative values.
pub trait Metric {
    fn distance(&self, a: &Location, b: &Location) -> f64;
}

/// Straight-line distance in the plane.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, a: &Location, b: &Location) -> f64 {
        a.distance(b)
    }
}
