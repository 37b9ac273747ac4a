//! Model assembly: turns a validated [`FrameModel`] into solver entities

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::analysis::AnalysisOptions;
use crate::elements::{
    BoundaryCondition, BoundaryKind, Dof, Member, MemberId, Mesh, NodeId, SectionId,
    SectionPropertyService,
};
use crate::error::{FrameError, FrameResult};
use crate::loads::{Load, LoadKind};
use crate::math::{scale, swap_yz, swap_yz_dofs};
use crate::mesh::{
    discretize, release_stiffness, resolve_axes, synthesize_release, IdAllocator, IdSpace,
    MemberAxes, ReleaseHardware,
};
use crate::model::FrameModel;
use crate::solver::{ElasticSection, FeSolver, Orientation};

/// One user member as it was handed to the solver
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMember {
    pub id: MemberId,
    /// Local frame in the external coordinate system
    pub axes: MemberAxes,
    /// Sub-nodes and solver sub-members
    pub mesh: Mesh,
    /// Release built at end i and end j, if any
    pub releases: [Option<ReleaseHardware>; 2],
}

/// Book-keeping of one assembly pass, needed to read results back
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub members: Vec<AssembledMember>,
    /// Duplicate nodes created for elastic supports
    pub ground_nodes: Vec<NodeId>,
}

impl Assembly {
    pub fn member(&self, id: MemberId) -> Option<&AssembledMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Interior sub-nodes of every member with their external coordinates
    pub fn interior_nodes(&self) -> impl Iterator<Item = (NodeId, [f64; 3])> + '_ {
        self.members
            .iter()
            .flat_map(|m| m.mesh.interior_nodes().iter().map(|n| (n.id, n.coords)))
    }
}

/// Tributary length of every sub-node of a uniformly segmented mesh.
///
/// Interior sub-nodes carry a full segment, the two end sub-nodes half of one.
pub fn tributary_lengths(mesh: &Mesh) -> Vec<f64> {
    let count = mesh.nodes.len();
    if count < 2 {
        return vec![0.0; count];
    }
    let segment = mesh.length / (count - 1) as f64;
    (0..count)
        .map(|k| if k == 0 || k == count - 1 { 0.5 * segment } else { segment })
        .collect()
}

/// Build the solver model for `model` inside `solver`.
///
/// The model must have passed [`FrameModel::validate`]; all coordinates and
/// vectors are mapped into the solver frame here.
pub fn assemble<S: FeSolver>(
    model: &FrameModel,
    solver: &mut S,
    options: &AnalysisOptions,
    sections: &dyn SectionPropertyService,
) -> FrameResult<Assembly> {
    let mut ids = IdSpace {
        nodes: IdAllocator::above(model.nodes.iter().map(|n| n.id)),
        elements: IdAllocator::above(model.members.iter().map(|m| m.id)),
        materials: IdAllocator::default(),
    };

    for node in &model.nodes {
        solver.add_node(node.id, swap_yz(node.coords()))?;
    }

    let mut elastic = HashMap::with_capacity(model.sections.len());
    for section in &model.sections {
        let props = sections
            .properties(&section.shape, &section.material)
            .map_err(|reason| FrameError::InvalidSection { section: section.id, reason })?;
        let constants = ElasticSection {
            e: props.e,
            a: props.a,
            iz: props.iz,
            iy: props.iy,
            g: props.g,
            j: props.j,
        };
        solver.add_elastic_section(section.id, constants)?;
        elastic.insert(section.id, constants);
        debug!(
            "Section {} ({}): A = {:.4e}, Iy = {:.4e}, Iz = {:.4e}, J = {:.4e}",
            section.id,
            section.shape.type_name(),
            props.a,
            props.iy,
            props.iz,
            props.j
        );
    }

    let mut assembly = Assembly::default();
    for member in &model.members {
        let assembled = assemble_member(model, member, &elastic, solver, options, &mut ids)?;
        assembly.members.push(assembled);
    }

    for bc in &model.boundary_conditions {
        let ground = apply_boundary_condition(bc, solver, &mut ids)?;
        assembly.ground_nodes.extend(ground);
    }

    for load in &model.loads {
        apply_load(load, &assembly, solver, options.load_factor)?;
    }

    info!(
        "Assembled {} members into {} sub-members",
        assembly.members.len(),
        assembly
            .members
            .iter()
            .map(|m| m.mesh.segment_count())
            .sum::<usize>()
    );
    Ok(assembly)
}

fn assemble_member<S: FeSolver>(
    model: &FrameModel,
    member: &Member,
    elastic: &HashMap<SectionId, ElasticSection>,
    solver: &mut S,
    options: &AnalysisOptions,
    ids: &mut IdSpace,
) -> FrameResult<AssembledMember> {
    let (start, end) = model.member_ends(member)?;
    let axes = resolve_axes(start, end, member.reference)?;
    solver.add_transformation(member.id, axes.solver_vecxz())?;

    let mut mesh = discretize(
        member,
        start,
        end,
        options.segment_length,
        &mut ids.nodes,
        &mut ids.elements,
    )?;
    for node in mesh.interior_nodes() {
        solver.add_node(node.id, swap_yz(node.coords))?;
    }

    let solver_axes = axes.to_solver();
    let (release_i, release_j) = member.release.end_releases();
    let section = elastic.get(&member.section).ok_or(FrameError::UndefinedSection {
        section: member.section,
        member: member.id,
    })?;
    let springs = release_stiffness(
        section,
        mesh.length,
        options.release_ratio,
        options.release_stiffness,
    );
    let hinge_i = synthesize_release(
        solver,
        member.i_node,
        release_i,
        &solver_axes,
        springs,
        ids,
    )?;
    let hinge_j = synthesize_release(
        solver,
        member.j_node,
        release_j,
        &solver_axes,
        springs,
        ids,
    )?;

    if let (Some(hinge), Some(first)) = (&hinge_i, mesh.members.first_mut()) {
        first.nodes[0] = hinge.free_node;
    }
    if let (Some(hinge), Some(last)) = (&hinge_j, mesh.members.last_mut()) {
        last.nodes[1] = hinge.free_node;
    }

    for sub in &mesh.members {
        solver.add_beam(sub.id, sub.nodes, sub.section, member.id)?;
    }

    Ok(AssembledMember {
        id: member.id,
        axes,
        mesh,
        releases: [hinge_i, hinge_j],
    })
}

/// Returns the ground nodes created for an elastic support
fn apply_boundary_condition<S: FeSolver>(
    bc: &BoundaryCondition,
    solver: &mut S,
    ids: &mut IdSpace,
) -> FrameResult<Vec<NodeId>> {
    match bc.kind {
        BoundaryKind::Rigid => {
            let restrained = swap_yz_dofs(bc.restraints());
            for &target in &bc.targets {
                solver.fix(target, restrained)?;
            }
            Ok(Vec::new())
        }
        BoundaryKind::Elastic => {
            let stiffness = swap_yz_dofs(bc.values());
            let mut grounds = Vec::with_capacity(bc.targets.len());
            for &target in &bc.targets {
                let coords = solver.node_coord(target)?;
                let ground = ids.nodes.allocate();
                solver.add_node(ground, coords)?;

                let mut springs = Vec::with_capacity(6);
                for dof in Dof::ALL {
                    let material = ids.materials.allocate();
                    solver.add_spring_material(material, stiffness[dof.index()])?;
                    springs.push((material, dof));
                }
                let element = ids.elements.allocate();
                solver.add_zero_length(element, [target, ground], &springs, Orientation::GLOBAL)?;
                solver.fix(ground, [true; 6])?;
                grounds.push(ground);
            }
            Ok(grounds)
        }
    }
}

fn apply_load<S: FeSolver>(
    load: &Load,
    assembly: &Assembly,
    solver: &mut S,
    load_factor: f64,
) -> FrameResult<()> {
    let force = swap_yz(load.value.scaled(load_factor).to_array());
    let nodal = |f: [f64; 3]| [f[0], f[1], f[2], 0.0, 0.0, 0.0];

    match load.kind {
        LoadKind::Nodal => {
            for &node in &load.targets {
                solver.add_nodal_load(node, nodal(force))?;
            }
        }
        LoadKind::Linear => {
            for &target in &load.targets {
                let member = assembly.member(target).ok_or_else(|| FrameError::UndefinedMember {
                    member: target,
                    owner: format!("Load {}", load.id),
                })?;
                let tributary = tributary_lengths(&member.mesh);
                for (node, length) in member.mesh.nodes.iter().zip(tributary) {
                    solver.add_nodal_load(node.id, nodal(scale(force, length)))?;
                }
            }
        }
        LoadKind::Unsupported => {
            warn!("Load {} has an unsupported type and is ignored", load.id);
        }
    }
    Ok(())
}
