//! Emulated end releases (hinges) built from soft springs and DOF ties

use log::debug;

use super::IdSpace;
use crate::elements::{Dof, ElementId, MaterialId, NodeId};
use crate::error::FrameResult;
use crate::solver::{ElasticSection, FeSolver, LocalAxes, Orientation};

/// Solver entities created for one released member end
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseHardware {
    /// Duplicate of the structural node the member end attaches to
    pub free_node: NodeId,
    /// Zero-length element carrying one soft spring per released DOF
    pub spring_element: ElementId,
    pub materials: Vec<MaterialId>,
    /// DOFs tied between the structural and the free node
    pub tied: Vec<Dof>,
}

/// Spring stiffness per local DOF for releases on a member of `length`.
///
/// Each spring is `ratio` times the end stiffness of the member along that DOF
/// (EA/L, 12EI/L³, GJ/L, 4EI/L) and never softer than `floor`. Springs scaled
/// this way keep a member released in torsion at both ends factorizable.
pub fn release_stiffness(
    section: &ElasticSection,
    length: f64,
    ratio: f64,
    floor: f64,
) -> [f64; 6] {
    let l = length;
    let end = [
        section.e * section.a / l,
        12.0 * section.e * section.iz / l.powi(3),
        12.0 * section.e * section.iy / l.powi(3),
        section.g * section.j / l,
        4.0 * section.e * section.iy / l,
        4.0 * section.e * section.iz / l,
    ];
    end.map(|k| (ratio * k).max(floor))
}

/// Build the release at `structural` for the DOFs flagged in `released`.
///
/// Returns `None` when nothing is released. Released DOFs get a spring of
/// the matching `stiffness` entry oriented along the member's local axes (solver frame); the
/// remaining DOFs are tied with an equal-DOF constraint.
pub fn synthesize_release<S: FeSolver>(
    solver: &mut S,
    structural: NodeId,
    released: [bool; 6],
    axes: &LocalAxes,
    stiffness: [f64; 6],
    ids: &mut IdSpace,
) -> FrameResult<Option<ReleaseHardware>> {
    if !released.iter().any(|&r| r) {
        return Ok(None);
    }

    let coords = solver.node_coord(structural)?;
    let free_node = ids.nodes.allocate();
    solver.add_node(free_node, coords)?;

    let mut springs = Vec::new();
    let mut tied = Vec::new();
    for dof in Dof::ALL {
        if released[dof.index()] {
            let material = ids.materials.allocate();
            solver.add_spring_material(material, stiffness[dof.index()])?;
            springs.push((material, dof));
        } else {
            tied.push(dof);
        }
    }

    let spring_element = ids.elements.allocate();
    solver.add_zero_length(
        spring_element,
        [structural, free_node],
        &springs,
        Orientation {
            x: axes.x,
            yp: axes.y,
        },
    )?;
    if !tied.is_empty() {
        solver.add_equal_dof(structural, free_node, &tied)?;
    }

    debug!(
        "Release at node {}: free node {}, {} springs, {} tied DOFs",
        structural,
        free_node,
        springs.len(),
        tied.len()
    );

    Ok(Some(ReleaseHardware {
        free_node,
        spring_element,
        materials: springs.into_iter().map(|(material, _)| material).collect(),
        tied,
    }))
}
