//! Internal-force distribution along a beam element
//!
//! Starting from the end-i forces reported by the solver, the section forces
//! at a station `s` follow from static equilibrium of the segment [0, s]:
//!
//! ```text
//! N(s)  = -N1  - wx·s            - Px  (s > a)
//! Vy(s) =  Vy1 + wy·s            + Py  (s > a)
//! Vz(s) =  Vz1 + wz·s            + Pz  (s > a)
//! T(s)  = -T1
//! My(s) = -My1 - Vz1·s - ½wz·s²  - Pz·(s - a)  (s > a)
//! Mz(s) = -Mz1 + Vy1·s + ½wy·s²  + Py·(s - a)  (s > a)
//! ```

use serde::{Deserialize, Serialize};

use crate::loads::ElementLoad;
use crate::math::{add, distance, lerp, scale};
use crate::solver::{LocalAxes, LocalEndForces};

/// Offset of the extra station placed just past a point load
const POINT_LOAD_STEP: f64 = 0.001;

/// Stations closer than this are the same station
const STATION_TOLERANCE: f64 = 1e-12;

/// One of the six section force components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceComponent {
    N,
    Vy,
    Vz,
    T,
    My,
    Mz,
}

impl ForceComponent {
    pub const ALL: [ForceComponent; 6] = [
        ForceComponent::N,
        ForceComponent::Vy,
        ForceComponent::Vz,
        ForceComponent::T,
        ForceComponent::My,
        ForceComponent::Mz,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ForceComponent::N => "N",
            ForceComponent::Vy => "Vy",
            ForceComponent::Vz => "Vz",
            ForceComponent::T => "T",
            ForceComponent::My => "My",
            ForceComponent::Mz => "Mz",
        }
    }

    /// Unit of the reported value
    pub fn unit(self) -> &'static str {
        match self {
            ForceComponent::N | ForceComponent::Vy | ForceComponent::Vz => "kN",
            ForceComponent::T | ForceComponent::My | ForceComponent::Mz => "kNm",
        }
    }

    /// Local axis a diagram of this component is drawn along, and its sign
    pub fn projection(self, axes: &LocalAxes) -> [f64; 3] {
        match self {
            ForceComponent::N | ForceComponent::Vy | ForceComponent::T => axes.y,
            ForceComponent::Vz | ForceComponent::My => axes.z,
            ForceComponent::Mz => scale(axes.y, -1.0),
        }
    }
}

/// Section forces at one station, ordered as [`ForceComponent::ALL`]
pub type SectionForces = [f64; 6];

/// A station along the element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceStation {
    /// Distance from end i
    pub s: f64,
    /// Location of the station, in the frame of the end coordinates
    pub point: [f64; 3],
    pub forces: SectionForces,
}

impl ForceStation {
    pub fn get(&self, component: ForceComponent) -> f64 {
        self.forces[component.index()]
    }
}

/// Section forces along an element between `start` and `end`.
///
/// `nep` equally spaced stations (at least the two ends) are evaluated, plus
/// a pair of stations around each point load so the step shows in the diagram.
pub fn section_force_distribution(
    start: [f64; 3],
    end: [f64; 3],
    end_forces: &LocalEndForces,
    nep: usize,
    loads: &[ElementLoad],
) -> Vec<ForceStation> {
    let length = distance(start, end);
    let stations = stations(length, nep, loads);

    stations
        .into_iter()
        .map(|s| {
            let t = if length > 0.0 { s / length } else { 0.0 };
            ForceStation {
                s,
                point: lerp(start, end, t),
                forces: forces_at(s, length, end_forces, loads),
            }
        })
        .collect()
}

fn stations(length: f64, nep: usize, loads: &[ElementLoad]) -> Vec<f64> {
    let nep = nep.max(2);
    let mut stations: Vec<f64> = (0..nep)
        .map(|k| length * k as f64 / (nep - 1) as f64)
        .collect();

    for load in loads {
        if let ElementLoad::Point { a_over_l, .. } = *load {
            let a = a_over_l * length;
            let exists = stations.iter().any(|&s| (s - a).abs() < STATION_TOLERANCE);
            if !exists {
                stations.push(a);
            }
            stations.push(a + POINT_LOAD_STEP);
        }
    }

    stations.sort_by(|a, b| a.total_cmp(b));
    stations.dedup_by(|a, b| (*a - *b).abs() < STATION_TOLERANCE);
    stations
}

fn forces_at(s: f64, length: f64, end_forces: &LocalEndForces, loads: &[ElementLoad]) -> SectionForces {
    let f1 = match *end_forces {
        LocalEndForces::Axial(n) => return [-n, 0.0, 0.0, 0.0, 0.0, 0.0],
        LocalEndForces::Frame(f) => f,
    };
    let (n1, vy1, vz1, t1, my1, mz1) = (f1[0], f1[1], f1[2], f1[3], f1[4], f1[5]);

    let mut n = -n1;
    let mut vy = vy1;
    let mut vz = vz1;
    let t = -t1;
    let mut my = -my1 - vz1 * s;
    let mut mz = -mz1 + vy1 * s;

    for load in loads {
        match *load {
            ElementLoad::Uniform { wy, wz, wx } => {
                n -= wx * s;
                vy += wy * s;
                vz += wz * s;
                mz += 0.5 * wy * s * s;
                my -= 0.5 * wz * s * s;
            }
            ElementLoad::Point { py, pz, a_over_l, px } => {
                let a = a_over_l * length;
                if s > a {
                    n -= px;
                    vy += py;
                    vz += pz;
                    my -= pz * (s - a);
                    mz += py * (s - a);
                }
            }
        }
    }

    [n, vy, vz, t, my, mz]
}

/// Diagram point for `value` (solver units) of `component` drawn from `point`
pub fn displaced_position(
    point: [f64; 3],
    component: ForceComponent,
    value: f64,
    axes: &LocalAxes,
    diagram_scale: f64,
) -> [f64; 3] {
    add(point, scale(component.projection(axes), value * diagram_scale))
}
