//! Result types and reconstruction of member force diagrams

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::assembler::{AssembledMember, Assembly};
use crate::elements::{MemberId, Mesh, NodeId};
use crate::error::FrameResult;
use crate::forces::{displaced_position, section_force_distribution, ForceComponent, SectionForces};
use crate::math::{round_to, swap_yz, swap_yz_generalized};
use crate::mesh::MemberAxes;
use crate::model::FrameModel;
use crate::solver::FeSolver;

/// Evaluation points per sub-element: its two ends
const SUB_ELEMENT_STATIONS: usize = 2;

/// Displacement of a node in the external frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeDisplacement {
    pub ux: f64,
    pub uy: f64,
    pub uz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [UX, UY, UZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            ux: arr[0],
            uy: arr[1],
            uz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.ux.powi(2) + self.uy.powi(2) + self.uz.powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub displacement: NodeDisplacement,
}

/// One force component at a sub-node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effort {
    pub value: f64,
    pub unit: String,
    /// Diagram point in the external frame
    pub displaced_position: [f64; 3],
}

/// The six force components at a sub-node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Efforts {
    #[serde(rename = "N")]
    pub n: Effort,
    #[serde(rename = "Vy")]
    pub vy: Effort,
    #[serde(rename = "Vz")]
    pub vz: Effort,
    #[serde(rename = "T")]
    pub t: Effort,
    #[serde(rename = "My")]
    pub my: Effort,
    #[serde(rename = "Mz")]
    pub mz: Effort,
}

impl Efforts {
    pub fn get(&self, component: ForceComponent) -> &Effort {
        match component {
            ForceComponent::N => &self.n,
            ForceComponent::Vy => &self.vy,
            ForceComponent::Vz => &self.vz,
            ForceComponent::T => &self.t,
            ForceComponent::My => &self.my,
            ForceComponent::Mz => &self.mz,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEffort {
    pub node: NodeId,
    pub coord: [f64; 3],
    pub efforts: Efforts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    pub id: MemberId,
    pub length: f64,
    pub local_axes: MemberAxes,
    pub mesh: Mesh,
    /// Ordered from end i to end j
    pub node_efforts: Vec<NodeEffort>,
}

impl MemberResult {
    pub fn effort(&self, node: NodeId) -> Option<&NodeEffort> {
        self.node_efforts.iter().find(|e| e.node == node)
    }
}

/// Complete result document of one analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub nodes: Vec<NodeResult>,
    pub members: Vec<MemberResult>,
}

impl AnalysisResult {
    pub fn node(&self, id: NodeId) -> Option<&NodeResult> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberResult> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
struct Accumulated {
    coord: [f64; 3],
    values: SectionForces,
    displaced: [[f64; 3]; 6],
}

/// Per-sub-node effort map of one member.
///
/// The first record of a node is stored as is; each further record replaces
/// every value with the mean of the stored and the new value. Diagram points
/// keep their first record.
#[derive(Debug, Clone, Default)]
pub struct EffortAccumulator {
    order: Vec<NodeId>,
    entries: HashMap<NodeId, Accumulated>,
}

impl EffortAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        node: NodeId,
        coord: [f64; 3],
        values: SectionForces,
        displaced: [[f64; 3]; 6],
    ) {
        match self.entries.get_mut(&node) {
            Some(entry) => {
                for (stored, new) in entry.values.iter_mut().zip(values) {
                    *stored = 0.5 * (*stored + new);
                }
            }
            None => {
                self.order.push(node);
                self.entries.insert(
                    node,
                    Accumulated {
                        coord,
                        values,
                        displaced,
                    },
                );
            }
        }
    }

    /// Current (unscaled) value of a component at a node
    pub fn value(&self, node: NodeId, component: ForceComponent) -> Option<f64> {
        self.entries
            .get(&node)
            .map(|entry| entry.values[component.index()])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in first-seen order, values divided by `load_factor` and rounded
    pub fn into_efforts(mut self, load_factor: f64, precision: u32) -> Vec<NodeEffort> {
        self.order
            .iter()
            .filter_map(|node| self.entries.remove(node).map(|entry| (*node, entry)))
            .map(|(node, entry)| {
                let effort = |component: ForceComponent| Effort {
                    value: round_to(entry.values[component.index()] / load_factor, precision),
                    unit: component.unit().to_string(),
                    displaced_position: entry.displaced[component.index()],
                };
                NodeEffort {
                    node,
                    coord: entry.coord,
                    efforts: Efforts {
                        n: effort(ForceComponent::N),
                        vy: effort(ForceComponent::Vy),
                        vz: effort(ForceComponent::Vz),
                        t: effort(ForceComponent::T),
                        my: effort(ForceComponent::My),
                        mz: effort(ForceComponent::Mz),
                    },
                }
            })
            .collect()
    }
}

/// Read the analysed solver state back into a result document
pub fn reconstruct<S: FeSolver>(
    model: &FrameModel,
    assembly: &Assembly,
    solver: &S,
    options: &AnalysisOptions,
) -> FrameResult<AnalysisResult> {
    let members = assembly
        .members
        .iter()
        .map(|member| reconstruct_member(member, solver, options))
        .collect::<FrameResult<Vec<_>>>()?;

    let mut nodes = Vec::with_capacity(model.nodes.len());
    let user_nodes = model.nodes.iter().map(|n| (n.id, n.coords()));
    for (id, [x, y, z]) in user_nodes.chain(assembly.interior_nodes()) {
        let displacement = swap_yz_generalized(solver.node_displacement(id)?);
        nodes.push(NodeResult {
            id,
            x,
            y,
            z,
            displacement: NodeDisplacement::from_array(displacement),
        });
    }

    info!(
        "Reconstructed {} members and {} node displacements",
        members.len(),
        nodes.len()
    );
    if let Some(peak) = nodes.iter().max_by(|a, b| {
        a.displacement
            .translation_magnitude()
            .total_cmp(&b.displacement.translation_magnitude())
    }) {
        debug!(
            "Largest translation {:.4e} m at node {}",
            peak.displacement.translation_magnitude(),
            peak.id
        );
    }
    Ok(AnalysisResult { nodes, members })
}

fn reconstruct_member<S: FeSolver>(
    member: &AssembledMember,
    solver: &S,
    options: &AnalysisOptions,
) -> FrameResult<MemberResult> {
    let mesh = &member.mesh;
    let mut accumulator = EffortAccumulator::new();

    for (k, sub) in mesh.members.iter().enumerate() {
        let [ni, nj] = solver.element_nodes(sub.id)?;
        let start = solver.node_coord(ni)?;
        let end = solver.node_coord(nj)?;
        let end_forces = solver.element_local_forces(sub.id)?;
        let axes = solver.element_local_axes(sub.id)?;

        let stations = section_force_distribution(start, end, &end_forces, SUB_ELEMENT_STATIONS, &[]);
        let ends = [
            (&mesh.nodes[k], stations.first()),
            (&mesh.nodes[k + 1], stations.last()),
        ];
        for (mesh_node, station) in ends {
            let Some(station) = station else { continue };
            let displaced = ForceComponent::ALL.map(|component| {
                swap_yz(displaced_position(
                    station.point,
                    component,
                    station.get(component),
                    &axes,
                    options.diagram_scale,
                ))
            });
            accumulator.record(mesh_node.id, mesh_node.coords, station.forces, displaced);
        }
    }

    debug!(
        "Member {}: {} sub-elements, {} effort records",
        member.id,
        mesh.segment_count(),
        accumulator.len()
    );

    Ok(MemberResult {
        id: member.id,
        length: mesh.length,
        local_axes: member.axes,
        mesh: mesh.clone(),
        node_efforts: accumulator.into_efforts(options.load_factor, options.precision),
    })
}
