use std::f64::consts::PI;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use frame_fea::assembler::assemble;
use frame_fea::elements::{Dof, ElementId, MaterialId, NodeId, SectionId};
use frame_fea::forces::section_force_distribution;
use frame_fea::prelude::*;
use frame_fea::solver::{
    ElasticSection, LocalAxes, LocalEndForces, Orientation, SolverError, StaticAnalysis,
    TransformationId,
};

const E: f64 = 210e9;
const P: f64 = 10_000.0;

/// Width x height rectangle, as in the document units (mm)
const WIDTH: f64 = 300.0;
const HEIGHT: f64 = 500.0;

fn iy_rect() -> f64 {
    let (b, h) = (WIDTH * 1e-3, HEIGHT * 1e-3);
    b * h.powi(3) / 12.0
}

fn steel_section(model: &mut FrameModel) {
    model
        .add_section(Section::rectangular(1, WIDTH, HEIGHT, Material::new(E, 0.3)))
        .unwrap();
}

/// Horizontal 2 m cantilever along X, fixed at node 1, loaded at node 2
fn cantilever(load: LoadVector) -> FrameModel {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 2.0, 0.0, 0.0)).unwrap();
    steel_section(&mut model);
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1]))
        .unwrap();
    model.add_load(Load::nodal(1, vec![2], load)).unwrap();
    model
}

fn analyse(model: &FrameModel) -> AnalysisResult {
    let mut solver = LinearStaticSolver::new();
    run_analysis(model, &mut solver, &AnalysisOptions::default()).unwrap()
}

#[test]
fn test_cantilever_diagrams() {
    let result = analyse(&cantilever(LoadVector::new(0.0, 0.0, -10.0)));
    let member = result.member(1).unwrap();

    assert_eq!(member.mesh.segment_count(), 4);
    assert_eq!(member.mesh.nodes.len(), 5);
    assert_relative_eq!(member.length, 2.0);
    assert_eq!(member.node_efforts.len(), 5);
    assert_eq!(member.node_efforts[0].node, 1);
    assert_eq!(member.node_efforts[4].node, 2);

    for (k, record) in member.node_efforts.iter().enumerate() {
        let efforts = &record.efforts;
        assert_eq!(efforts.n.value, 0.0);
        assert_eq!(efforts.vz.value, 10.0);
        assert_eq!(efforts.vz.unit, "kN");
        assert_eq!(efforts.vy.value, 0.0);
        assert_eq!(efforts.t.value, 0.0);
        assert_eq!(efforts.mz.value, 0.0);
        // My = P (L - s)
        assert_eq!(efforts.my.value, 20.0 - 5.0 * k as f64);
        assert_eq!(efforts.my.unit, "kNm");
        assert_relative_eq!(record.coord[0], 0.5 * k as f64, epsilon = 1e-12);
    }

    // diagrams are drawn along local z, which is vertical here
    let root = &member.node_efforts[0].efforts;
    assert_relative_eq!(root.my.displaced_position[2], 20_000.0 * 1e-5, epsilon = 1e-6);
    assert_abs_diff_eq!(root.my.displaced_position[1], 0.0, epsilon = 1e-9);
}

#[test]
fn test_cantilever_tip_matches_euler_bernoulli() {
    let result = analyse(&cantilever(LoadVector::new(0.0, 0.0, -10.0)));
    let tip = result.node(2).unwrap().displacement;
    let l: f64 = 2.0;

    let ei = E * iy_rect();
    assert_relative_eq!(tip.uz, -P * l.powi(3) / (3.0 * ei), max_relative = 1e-6);
    assert_relative_eq!(tip.ry, P * l.powi(2) / (2.0 * ei), max_relative = 1e-6);
    assert_abs_diff_eq!(tip.ux, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(tip.uy, 0.0, epsilon = 1e-12);

    let root = result.node(1).unwrap().displacement;
    assert_eq!(root.translation_magnitude(), 0.0);

    // interior sub-nodes are reported too
    assert_eq!(result.nodes.len(), 5);
}

#[test]
fn test_lateral_load_bends_about_local_z() {
    let result = analyse(&cantilever(LoadVector::new(0.0, 10.0, 0.0)));
    let (b, h) = (WIDTH * 1e-3, HEIGHT * 1e-3);
    let iz = h * b.powi(3) / 12.0;
    let l: f64 = 2.0;

    let tip = result.node(2).unwrap().displacement;
    assert_relative_eq!(tip.uy, P * l.powi(3) / (3.0 * E * iz), max_relative = 1e-6);

    let member = result.member(1).unwrap();
    let root = &member.node_efforts[0].efforts;
    assert_eq!(root.vz.value, 0.0);
    assert_eq!(root.my.value, 0.0);
    assert_eq!(root.vy.value.abs(), 10.0);
    assert_eq!(root.mz.value.abs(), 20.0);
}

#[test]
fn test_hinge_splits_load_between_cantilevers() {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 1.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(3, 2.0, 0.0, 0.0)).unwrap();
    steel_section(&mut model);
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model
        .add_member(Member::new(2, 2, 3, 1).with_release(ReleasePattern::PinnedFixed))
        .unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1, 3]))
        .unwrap();
    model
        .add_load(Load::nodal(1, vec![2], LoadVector::new(0.0, 0.0, -10.0)))
        .unwrap();

    let result = analyse(&model);

    let left = result.member(1).unwrap();
    assert_eq!(left.node_efforts[0].efforts.vz.value, 5.0);
    assert_eq!(left.node_efforts[0].efforts.my.value, 5.0);
    assert_eq!(left.effort(2).unwrap().efforts.my.value, 0.0);

    let right = result.member(2).unwrap();
    assert_eq!(right.effort(2).unwrap().efforts.my.value, 0.0);
    assert_eq!(right.effort(2).unwrap().efforts.vz.value, -5.0);
    assert_eq!(right.effort(3).unwrap().efforts.my.value, 5.0);

    let ei = E * iy_rect();
    let hinge = result.node(2).unwrap().displacement;
    assert_relative_eq!(hinge.uz, -(P / 2.0) / (3.0 * ei), max_relative = 1e-6);

    // release nodes stay internal: 3 user nodes + 2 interior nodes
    assert_eq!(result.nodes.len(), 5);
}

#[test]
fn test_pinned_pinned_beam_is_simply_supported() {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 4.0, 0.0, 0.0)).unwrap();
    steel_section(&mut model);
    model
        .add_member(Member::new(1, 1, 2, 1).with_release(ReleasePattern::PinnedPinned))
        .unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1, 2]))
        .unwrap();
    model
        .add_load(Load::linear(1, vec![1], LoadVector::new(0.0, 0.0, -10.0)))
        .unwrap();

    let result = analyse(&model);
    let member = result.member(1).unwrap();
    assert_eq!(member.node_efforts.len(), 9);

    let start = &member.effort(1).unwrap().efforts;
    let end = &member.effort(2).unwrap().efforts;
    assert_eq!(start.my.value, 0.0);
    assert_eq!(end.my.value, 0.0);
    assert_eq!(start.t.value, 0.0);
    // 40 kN less the two half-segment shares lumped on the supports
    assert_eq!(start.vz.value, 17.5);
    assert_eq!(end.vz.value, -17.5);
    // wL²/8, sagging
    assert_eq!(member.node_efforts[4].efforts.my.value, -20.0);
}

#[test]
fn test_fixed_pinned_member_props_a_cantilever() {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 2.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(3, 4.0, 0.0, 0.0)).unwrap();
    steel_section(&mut model);
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model
        .add_member(Member::new(2, 2, 3, 1).with_release(ReleasePattern::FixedPinned))
        .unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1, 3]))
        .unwrap();
    model
        .add_load(Load::nodal(1, vec![2], LoadVector::new(0.0, 0.0, -16.0)))
        .unwrap();

    let result = analyse(&model);

    // propped cantilever, point load at midspan: 3PL/16 at the wall, 5PL/32 under the load
    let left = result.member(1).unwrap();
    assert_eq!(left.effort(1).unwrap().efforts.my.value, 12.0);
    assert_eq!(left.effort(1).unwrap().efforts.vz.value, 11.0);
    assert_eq!(left.effort(2).unwrap().efforts.my.value, -10.0);

    let right = result.member(2).unwrap();
    assert_eq!(right.effort(2).unwrap().efforts.my.value, -10.0);
    assert_eq!(right.effort(3).unwrap().efforts.my.value, 0.0);
    assert_eq!(right.effort(3).unwrap().efforts.vz.value, -5.0);

    let l: f64 = 4.0;
    let load = 16.0 * 1e3;
    let midspan = result.node(2).unwrap().displacement;
    assert_relative_eq!(
        midspan.uz,
        -7.0 * load * l.powi(3) / (768.0 * E * iy_rect()),
        max_relative = 1e-6
    );
}

/// Fixed-base portal: 12 m columns at nodes 1-2 and 4-3, 30 m beam 2-3
fn portal_frame(beam_load: LoadVector) -> FrameModel {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 0.0, 0.0, 12.0)).unwrap();
    model.add_node(Node::new(3, 30.0, 0.0, 12.0)).unwrap();
    model.add_node(Node::new(4, 30.0, 0.0, 0.0)).unwrap();
    model
        .add_section(Section::new(
            1,
            SectionShape::I {
                depth: 900.0,
                width: 300.0,
                tw: 16.0,
                tf: 26.0,
            },
            Material::steel(),
        ))
        .unwrap();
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model.add_member(Member::new(2, 2, 3, 1)).unwrap();
    model.add_member(Member::new(3, 4, 3, 1)).unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1, 4]))
        .unwrap();
    model.add_load(Load::linear(1, vec![2], beam_load)).unwrap();
    model
}

#[test]
fn test_portal_frame_base_reactions_balance_beam_load() {
    for (x, y, z) in [(5.0, 2.0, -50.0), (50.0, 20.0, -500.0)] {
        let result = analyse(&portal_frame(LoadVector::new(x, y, z)));
        assert_eq!(result.member(2).unwrap().mesh.segment_count(), 60);

        let bases: Vec<_> = [1, 3]
            .iter()
            .map(|&id| result.member(id).unwrap().node_efforts[0].efforts.clone())
            .collect();
        // column local axes: x up, y along -Y, z along X
        let n: f64 = bases.iter().map(|e| e.n.value).sum();
        let vy: f64 = bases.iter().map(|e| e.vy.value).sum();
        let vz: f64 = bases.iter().map(|e| e.vz.value).sum();
        assert_abs_diff_eq!(n, 30.0 * z, epsilon = 0.05);
        assert_abs_diff_eq!(vy, 30.0 * y, epsilon = 0.05);
        assert_abs_diff_eq!(vz, -30.0 * x, epsilon = 0.05);
    }
}

#[test]
fn test_symmetric_portal_frame() {
    let result = analyse(&portal_frame(LoadVector::new(0.0, 0.0, -50.0)));

    let left = &result.member(1).unwrap().node_efforts[0].efforts;
    let right = &result.member(3).unwrap().node_efforts[0].efforts;
    assert_abs_diff_eq!(left.n.value, -750.0, epsilon = 0.01);
    assert_abs_diff_eq!(right.n.value, -750.0, epsilon = 0.01);
    assert_abs_diff_eq!(left.my.value, -right.my.value, epsilon = 0.01);

    let beam = result.member(2).unwrap();
    let midspan = &beam.node_efforts[30].efforts;
    assert_abs_diff_eq!(midspan.vz.value, 0.0, epsilon = 0.01);
    assert!(midspan.my.value < 0.0);
    let sway = result.node(2).unwrap().displacement.ux + result.node(3).unwrap().displacement.ux;
    assert_abs_diff_eq!(sway, 0.0, epsilon = 1e-9);
}

#[test]
fn test_sub_element_equilibrium() {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 3.0, 2.0, 1.5)).unwrap();
    steel_section(&mut model);
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1]))
        .unwrap();
    model
        .add_load(Load::nodal(1, vec![2], LoadVector::new(5.0, -3.0, -10.0)))
        .unwrap();

    let options = AnalysisOptions::default();
    let mut solver = LinearStaticSolver::new();
    let assembly = assemble(&model, &mut solver, &options, &StandardSections).unwrap();
    solver.analyze(&options.static_analysis()).unwrap();

    let member = assembly.member(1).unwrap();
    assert_eq!(member.mesh.segment_count(), 8);
    for sub in &member.mesh.members {
        let forces = solver.element_local_forces(sub.id).unwrap();
        let LocalEndForces::Frame(f) = forces else {
            panic!("beam reported axial forces");
        };
        let [ni, nj] = solver.element_nodes(sub.id).unwrap();
        let start = solver.node_coord(ni).unwrap();
        let end = solver.node_coord(nj).unwrap();
        let l = member.mesh.length / 8.0;

        for k in 0..4 {
            assert_abs_diff_eq!(f[k] + f[k + 6], 0.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(f[4] + f[10] + l * f[2], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f[5] + f[11] - l * f[1], 0.0, epsilon = 1e-6);

        let stations = section_force_distribution(start, end, &forces, 2, &[]);
        let far = stations.last().unwrap();
        assert_relative_eq!(far.s, l, epsilon = 1e-12);
        let expected = [f[6], -f[7], -f[8], f[9], f[10], f[11]];
        for (actual, expected) in far.forces.iter().zip(expected) {
            assert_abs_diff_eq!(*actual, expected, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_linear_load_lumped_by_tributary_length() {
    let mut model = cantilever(LoadVector::default());
    model.loads.clear();
    model
        .add_load(Load::linear(1, vec![1], LoadVector::new(0.0, 0.0, -4.0)))
        .unwrap();

    let result = analyse(&model);
    let root = &result.member(1).unwrap().node_efforts[0].efforts;
    // 4 kN/m over 2 m, minus the quarter segment lumped on the support
    assert_eq!(root.vz.value, 7.0);
    assert_eq!(root.my.value, 8.0);
}

#[test]
fn test_elastic_support_shares_tip_load() {
    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    let l: f64 = 2.0;
    let k = 3.0 * E * iy_rect() / l.powi(3);
    model
        .add_boundary_condition(BoundaryCondition::elastic(
            2,
            vec![2],
            [0.0, 0.0, k, 0.0, 0.0, 0.0],
        ))
        .unwrap();

    let result = analyse(&model);
    let tip = result.node(2).unwrap().displacement;
    assert_relative_eq!(tip.uz, -P / (2.0 * k), max_relative = 1e-6);

    let root = &result.member(1).unwrap().node_efforts[0].efforts;
    assert_eq!(root.vz.value, 5.0);
    // the ground node is not part of the result
    assert_eq!(result.nodes.len(), 5);
}

#[test]
fn test_vertical_column() {
    let mut model = FrameModel::new();
    model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new(2, 0.0, 0.0, 3.0)).unwrap();
    model
        .add_section(Section::new(
            1,
            SectionShape::Circular { diameter: 300.0 },
            Material::new(E, 0.3),
        ))
        .unwrap();
    model.add_member(Member::new(1, 1, 2, 1)).unwrap();
    model
        .add_boundary_condition(BoundaryCondition::fixed(1, vec![1]))
        .unwrap();
    model
        .add_load(Load::nodal(1, vec![2], LoadVector::new(10.0, 0.0, 0.0)))
        .unwrap();

    let result = analyse(&model);
    let member = result.member(1).unwrap();
    assert_eq!(member.mesh.segment_count(), 6);
    assert_relative_eq!(member.local_axes.z[0], 1.0, epsilon = 1e-12);

    let root = &member.node_efforts[0].efforts;
    assert_eq!(root.vz.value, -10.0);
    assert_eq!(root.my.value, -30.0);
    assert_eq!(member.effort(2).unwrap().efforts.my.value, 0.0);

    let r: f64 = 0.15;
    let i = PI * r.powi(4) / 4.0;
    let l: f64 = 3.0;
    let top = result.node(2).unwrap().displacement;
    assert_relative_eq!(top.ux, P * l.powi(3) / (3.0 * E * i), max_relative = 1e-6);
}

#[test]
fn test_document_round_trip() {
    let json = r#"{
        "nodes": [{"id": 1, "x": 0.0, "y": 0.0, "z": 0.0},
                  {"id": 2, "x": 2.0, "y": 0.0, "z": 0.0}],
        "members": [{"id": 1, "nodei": 1, "nodej": 2, "section": 1, "vecxz": [0, 0, 1]}],
        "sections": [{"id": 1, "type": "Rectangular", "width": 300, "height": 500,
                      "material": {"E": 2.1e11, "nu": 0.3}}],
        "boundary_conditions": [{"id": 1, "targets": [1], "type": "fixed",
                                 "dx": 1, "dy": 1, "dz": 1, "rx": 1, "ry": 1, "rz": 1}],
        "loads": [{"id": 1, "type": "nodal", "targets": [2],
                   "value": {"x": 0, "y": 0, "z": -10}}]
    }"#;
    let model = FrameModel::from_json(json).unwrap();
    let result = analyse(&model);
    assert_eq!(result.member(1).unwrap().node_efforts[0].efforts.my.value, 20.0);

    let document = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&document).unwrap();
    let efforts = &value["members"][0]["node_efforts"][0]["efforts"];
    assert_eq!(efforts["My"]["value"], 20.0);
    assert_eq!(efforts["Vz"]["unit"], "kN");
    assert!(value["nodes"][1]["displacement"]["uz"].as_f64().unwrap() < 0.0);
}

#[test]
fn test_unknown_section_type_is_invalid_section() {
    let json = r#"{"sections": [{"id": 3, "type": "Tee", "depth": 200,
                     "material": {"E": 2.1e11, "nu": 0.3}}]}"#;
    let err = FrameModel::from_json(json).unwrap_err();
    assert!(matches!(err, FrameError::InvalidSection { section: 3, .. }));
}

/// Solver that must never be reached
struct Untouchable;

impl FeSolver for Untouchable {
    fn reset(&mut self) {
        panic!("solver called");
    }
    fn add_node(&mut self, _: NodeId, _: [f64; 3]) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_transformation(&mut self, _: TransformationId, _: [f64; 3]) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_elastic_section(&mut self, _: SectionId, _: ElasticSection) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_spring_material(&mut self, _: MaterialId, _: f64) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_beam(
        &mut self,
        _: ElementId,
        _: [NodeId; 2],
        _: SectionId,
        _: TransformationId,
    ) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_zero_length(
        &mut self,
        _: ElementId,
        _: [NodeId; 2],
        _: &[(MaterialId, Dof)],
        _: Orientation,
    ) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_equal_dof(&mut self, _: NodeId, _: NodeId, _: &[Dof]) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn fix(&mut self, _: NodeId, _: [bool; 6]) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn add_nodal_load(&mut self, _: NodeId, _: [f64; 6]) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn analyze(&mut self, _: &StaticAnalysis) -> Result<(), SolverError> {
        panic!("solver called")
    }
    fn node_displacement(&self, _: NodeId) -> Result<[f64; 6], SolverError> {
        panic!("solver called")
    }
    fn node_coord(&self, _: NodeId) -> Result<[f64; 3], SolverError> {
        panic!("solver called")
    }
    fn element_nodes(&self, _: ElementId) -> Result<[NodeId; 2], SolverError> {
        panic!("solver called")
    }
    fn element_local_forces(&self, _: ElementId) -> Result<LocalEndForces, SolverError> {
        panic!("solver called")
    }
    fn element_local_axes(&self, _: ElementId) -> Result<LocalAxes, SolverError> {
        panic!("solver called")
    }
}

#[test]
fn test_invalid_models_never_reach_the_solver() {
    let options = AnalysisOptions::default();

    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    model.members.push(Member::new(2, 1, 42, 1));
    let err = run_analysis(&model, &mut Untouchable, &options).unwrap_err();
    assert!(err.is_invalid_reference());

    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    model.loads.push(Load::linear(5, vec![9], LoadVector::new(0.0, 0.0, -1.0)));
    let err = run_analysis(&model, &mut Untouchable, &options).unwrap_err();
    assert!(matches!(err, FrameError::UndefinedMember { member: 9, .. }));

    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    model.members[0].reference = Some([1.0, 0.0, 0.0]);
    let err = run_analysis(&model, &mut Untouchable, &options).unwrap_err();
    assert!(matches!(err, FrameError::InvalidGeometry(_)));

    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    model.nodes[1].x = f64::NAN;
    let err = run_analysis(&model, &mut Untouchable, &options).unwrap_err();
    assert!(matches!(err, FrameError::InvalidGeometry(_)));
}

#[test]
fn test_mechanism_is_a_numerical_error() {
    // no supports at all
    let mut model = cantilever(LoadVector::new(0.0, 0.0, -10.0));
    model.boundary_conditions.clear();
    let mut solver = LinearStaticSolver::new();
    let err = run_analysis(&model, &mut solver, &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::SolverNumerical(_)));
    // cleared after the failure
    assert_eq!(solver.node_count(), 0);
}
