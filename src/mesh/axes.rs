//! Local axes of a member

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::math::{cross, norm, normalize, sub, swap_yz, GEOMETRY_TOLERANCE};
use crate::solver::LocalAxes;

const UP: [f64; 3] = [0.0, 1.0, 0.0];
const GLOBAL_X: [f64; 3] = [1.0, 0.0, 0.0];
const GLOBAL_Z: [f64; 3] = [0.0, 0.0, 1.0];

/// Orthonormal member frame in the external coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberAxes {
    pub x: [f64; 3],
    pub y: [f64; 3],
    pub z: [f64; 3],
}

impl MemberAxes {
    /// Local-z reference handed to the solver transformation
    pub fn solver_vecxz(&self) -> [f64; 3] {
        swap_yz(self.z)
    }

    /// The same member frame expressed in the solver frame.
    ///
    /// x and z map directly; y is rebuilt as z × x so the triad stays
    /// right-handed after the Y/Z exchange.
    pub fn to_solver(&self) -> LocalAxes {
        let x = swap_yz(self.x);
        let z = swap_yz(self.z);
        LocalAxes {
            x,
            y: cross(z, x),
            z,
        }
    }
}

/// Default local-z reference for a member direction `x` (unit vector)
pub fn default_reference(x: [f64; 3]) -> [f64; 3] {
    if norm(cross(UP, x)) < GEOMETRY_TOLERANCE {
        GLOBAL_X
    } else {
        GLOBAL_Z
    }
}

/// Resolve the local frame of a member from its end coordinates.
///
/// With an explicit `reference`, local-z lies along it (made orthogonal to
/// local-x) and local-y = z × x. Without one the reference comes from
/// [`default_reference`]; a member running along global Z, which that
/// reference would be parallel to, falls back to global X.
pub fn resolve_axes(
    start: [f64; 3],
    end: [f64; 3],
    reference: Option<[f64; 3]>,
) -> FrameResult<MemberAxes> {
    let x = normalize(sub(end, start)).ok_or_else(|| {
        FrameError::InvalidGeometry(format!(
            "zero-length member between {:?} and {:?}",
            start, end
        ))
    })?;

    let (reference, explicit) = match reference {
        Some(v) => (v, true),
        None => (default_reference(x), false),
    };

    let y = match normalize(cross(reference, x)) {
        Some(y) => y,
        None if !explicit => {
            debug!("Member along {:?} is parallel to its default reference, using global X", x);
            normalize(cross(GLOBAL_X, x)).ok_or_else(|| {
                FrameError::InvalidGeometry(format!("cannot orient member along {:?}", x))
            })?
        }
        None => {
            return Err(FrameError::InvalidGeometry(format!(
                "reference vector {:?} is parallel to member axis {:?}",
                reference, x
            )))
        }
    };
    let z = cross(x, y);

    Ok(MemberAxes { x, y, z })
}
