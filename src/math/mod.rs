//! Mathematical utilities for frame analysis

pub mod sparse;

use nalgebra::{Matrix3, SMatrix, SVector};

pub use sparse::{inverse_permutation, reverse_cuthill_mckee, SparseCholeskySolver, SparseMatrixBuilder};

pub type Mat3 = Matrix3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Geometric tolerance for lengths and parallel-vector tests
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn scale(a: [f64; 3], factor: f64) -> [f64; 3] {
    [a[0] * factor, a[1] * factor, a[2] * factor]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Unit vector along `a`, or `None` when `a` is (nearly) zero or not finite
pub fn normalize(a: [f64; 3]) -> Option<[f64; 3]> {
    let n = norm(a);
    if !n.is_finite() || n < GEOMETRY_TOLERANCE {
        None
    } else {
        Some(scale(a, 1.0 / n))
    }
}

/// Point at parameter `t` on the segment from `a` to `b`
pub fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    add(a, scale(sub(b, a), t))
}

pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(b, a))
}

/// Exchange the second and third slot of a 3-vector.
///
/// The solver frame is the external frame with Y and Z exchanged, so this maps
/// positions and forces both ways.
pub fn swap_yz(v: [f64; 3]) -> [f64; 3] {
    [v[0], v[2], v[1]]
}

/// Map a rotation (pseudo-vector) across the Y/Z exchange, both ways.
///
/// The exchange is a reflection, so the axial vector also changes sign.
pub fn swap_yz_rotation(r: [f64; 3]) -> [f64; 3] {
    [-r[0], -r[2], -r[1]]
}

/// Exchange the Y and Z slots of a per-DOF table (flags or stiffnesses)
pub fn swap_yz_dofs<T: Copy>(v: [T; 6]) -> [T; 6] {
    [v[0], v[2], v[1], v[3], v[5], v[4]]
}

/// Map a 6-component generalized vector (translations, rotations) across the exchange
pub fn swap_yz_generalized(v: [f64; 6]) -> [f64; 6] {
    let t = swap_yz([v[0], v[1], v[2]]);
    let r = swap_yz_rotation([v[3], v[4], v[5]]);
    [t[0], t[1], t[2], r[0], r[1], r[2]]
}

/// Round to a number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // normalise -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Direction cosine matrix with rows x, y, z
pub fn rotation_matrix(x: [f64; 3], y: [f64; 3], z: [f64; 3]) -> Mat3 {
    Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    )
}

/// Block-diagonal 12x12 transformation built from a direction cosine matrix
pub fn member_transformation_matrix(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for block in 0..4 {
        t.fixed_view_mut::<3, 3>(block * 3, block * 3).copy_from(r);
    }
    t
}

/// Local 12x12 stiffness matrix of an elastic Euler-Bernoulli frame element.
///
/// DOF order per end: ux, uy, uz, rx, ry, rz.
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let l = length;
    let mut k = Mat12::zeros();

    let axial = e * a / l;
    let torsion = g * j / l;
    for (i, stiffness) in [(0, axial), (3, torsion)] {
        k[(i, i)] = stiffness;
        k[(i + 6, i + 6)] = stiffness;
        k[(i, i + 6)] = -stiffness;
        k[(i + 6, i)] = -stiffness;
    }

    // Bending in the local x-y plane (uy, rz) uses Iz; x-z plane (uz, ry) uses Iy.
    // In the x-z plane a positive ry produces negative uz slope, hence `sign`.
    for (u, r, inertia, sign) in [(1, 5, iz, 1.0), (2, 4, iy, -1.0)] {
        let ei = e * inertia;
        let k1 = 12.0 * ei / (l * l * l);
        let k2 = sign * 6.0 * ei / (l * l);
        let k3 = 4.0 * ei / l;
        let k4 = 2.0 * ei / l;

        let entries = [
            (u, u, k1),
            (u, r, k2),
            (u, u + 6, -k1),
            (u, r + 6, k2),
            (r, r, k3),
            (r, u + 6, -k2),
            (r, r + 6, k4),
            (u + 6, u + 6, k1),
            (u + 6, r + 6, -k2),
            (r + 6, r + 6, k3),
        ];
        for (row, col, value) in entries {
            k[(row, col)] = value;
            k[(col, row)] = value;
        }
    }

    k
}
