//! Loads acting along a single solver element, in its local axes

use serde::{Deserialize, Serialize};

/// Element load used by the force distribution along a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ElementLoad {
    /// Uniform load per length over the full span
    Uniform { wy: f64, wz: f64, wx: f64 },
    /// Concentrated load at `a_over_l` times the element length from end i
    Point { py: f64, pz: f64, a_over_l: f64, px: f64 },
}

impl ElementLoad {
    pub fn uniform(wy: f64, wz: f64, wx: f64) -> Self {
        ElementLoad::Uniform { wy, wz, wx }
    }

    /// Point load; the position is clamped to the span
    pub fn point(py: f64, pz: f64, a_over_l: f64, px: f64) -> Self {
        ElementLoad::Point {
            py,
            pz,
            a_over_l: a_over_l.clamp(0.0, 1.0),
            px,
        }
    }
}
