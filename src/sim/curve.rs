//! Cubic Bezier curves for sloped and curved formations
//!
//! A curve is defined by four control points:
//! - p0, p3: end points
//! - p1, p2: handles pulling the curve toward them

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A cubic Bezier curve in section-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl BezierCurve {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Smooth S-shaped slope from `start` to `end`.
    ///
    /// Both handles sit at the horizontal midpoint, level with their end
    /// point, so the curve leaves and arrives flat.
    pub fn slope(start: Vec2, end: Vec2) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self {
            p0: start,
            p1: Vec2::new(mid_x, start.y),
            p2: Vec2::new(mid_x, end.y),
            p3: end,
        }
    }

    /// Point on the curve at `t` (clamped to [0, 1])
    pub fn point(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }
}
