//! In-process linear static solver session

use std::collections::HashMap;

use log::debug;
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use super::{
    ElasticSection, FeSolver, LocalAxes, LocalEndForces, Orientation, SolverError,
    StaticAnalysis, TransformationId,
};
use crate::elements::{Dof, ElementId, MaterialId, NodeId, SectionId};
use crate::math::{
    cross, distance, inverse_permutation, member_local_stiffness, member_transformation_matrix,
    normalize, reverse_cuthill_mckee, rotation_matrix, sub, Mat12, SparseCholeskySolver,
    SparseMatrixBuilder, Vec12,
};

struct SolverNode {
    coords: [f64; 3],
    fixed: [bool; 6],
}

struct BeamElement {
    nodes: [NodeId; 2],
    section: ElasticSection,
    axes: LocalAxes,
    length: f64,
}

struct ZeroLengthElement {
    nodes: [NodeId; 2],
    /// (stiffness, local direction)
    springs: Vec<(f64, Dof)>,
    axes: LocalAxes,
}

enum Element {
    Beam(BeamElement),
    ZeroLength(ZeroLengthElement),
}

impl Element {
    fn nodes(&self) -> [NodeId; 2] {
        match self {
            Element::Beam(beam) => beam.nodes,
            Element::ZeroLength(spring) => spring.nodes,
        }
    }

    fn axes(&self) -> LocalAxes {
        match self {
            Element::Beam(beam) => beam.axes,
            Element::ZeroLength(spring) => spring.axes,
        }
    }

    /// Stiffness in global axes, DOF order: end i then end j
    fn global_stiffness(&self) -> Mat12 {
        match self {
            Element::Beam(beam) => {
                let s = &beam.section;
                let k_local = member_local_stiffness(s.e, s.g, s.a, s.iy, s.iz, s.j, beam.length);
                let t = transformation(&beam.axes);
                t.transpose() * k_local * t
            }
            Element::ZeroLength(spring) => {
                let mut k = Mat12::zeros();
                for &(stiffness, dof) in &spring.springs {
                    let b = spring_vector(&spring.axes, dof);
                    k += stiffness * b * b.transpose();
                }
                k
            }
        }
    }
}

fn transformation(axes: &LocalAxes) -> Mat12 {
    member_transformation_matrix(&rotation_matrix(axes.x, axes.y, axes.z))
}

/// Deformation operator of one spring: relative motion of end j over end i along `dof`
fn spring_vector(axes: &LocalAxes, dof: Dof) -> Vec12 {
    let direction = [axes.x, axes.y, axes.z][dof.axis()];
    let offset = if dof.is_rotation() { 3 } else { 0 };
    let mut b = Vec12::zeros();
    for k in 0..3 {
        b[offset + k] = -direction[k];
        b[6 + offset + k] = direction[k];
    }
    b
}

struct Solution {
    /// Per node index, six global displacement components
    displacements: Vec<[f64; 6]>,
}

/// Linear elastic static solver for 3D frames.
///
/// Assembles the global stiffness in sparse form, renumbers equations with
/// reverse Cuthill-McKee and factorizes once with a skyline Cholesky. The
/// load-control/Newton loop then converges in one iteration per step for the
/// linear elements supported here.
#[derive(Default)]
pub struct LinearStaticSolver {
    nodes: Vec<SolverNode>,
    node_index: HashMap<NodeId, usize>,
    transformations: HashMap<TransformationId, [f64; 3]>,
    sections: HashMap<SectionId, ElasticSection>,
    materials: HashMap<MaterialId, f64>,
    elements: Vec<(ElementId, Element)>,
    element_index: HashMap<ElementId, usize>,
    equal_dofs: Vec<(NodeId, NodeId, Vec<Dof>)>,
    loads: HashMap<NodeId, [f64; 6]>,
    solution: Option<Solution>,
}

impl LinearStaticSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn node(&self, id: NodeId) -> Result<&SolverNode, SolverError> {
        self.node_index
            .get(&id)
            .map(|&i| &self.nodes[i])
            .ok_or(SolverError::UnknownNode(id))
    }

    fn element(&self, id: ElementId) -> Result<&Element, SolverError> {
        self.element_index
            .get(&id)
            .map(|&i| &self.elements[i].1)
            .ok_or(SolverError::UnknownElement(id))
    }

    fn push_element(&mut self, id: ElementId, element: Element) -> Result<(), SolverError> {
        if self.element_index.contains_key(&id) {
            return Err(SolverError::DuplicateTag { kind: "element", id });
        }
        self.element_index.insert(id, self.elements.len());
        self.elements.push((id, element));
        self.solution = None;
        Ok(())
    }

    /// Equation number of every global DOF (`node index * 6 + dof`), `None` when restrained.
    ///
    /// Equal-DOF constraints merge DOFs into one class; a class with any
    /// restrained member is restrained.
    fn number_equations(&self) -> (Vec<Option<usize>>, usize) {
        let total = self.nodes.len() * 6;
        let mut parent: Vec<usize> = (0..total).collect();

        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for (retained, constrained, dofs) in &self.equal_dofs {
            let r = self.node_index[retained];
            let c = self.node_index[constrained];
            for dof in dofs {
                let a = find(&mut parent, r * 6 + dof.index());
                let b = find(&mut parent, c * 6 + dof.index());
                if a != b {
                    parent[b] = a;
                }
            }
        }

        let mut class_fixed = vec![false; total];
        for (n, node) in self.nodes.iter().enumerate() {
            for d in 0..6 {
                if node.fixed[d] {
                    let root = find(&mut parent, n * 6 + d);
                    class_fixed[root] = true;
                }
            }
        }

        let mut class_equation: Vec<Option<usize>> = vec![None; total];
        let mut equations = vec![None; total];
        let mut count = 0;
        for dof in 0..total {
            let root = find(&mut parent, dof);
            if class_fixed[root] {
                continue;
            }
            let eq = *class_equation[root].get_or_insert_with(|| {
                count += 1;
                count - 1
            });
            equations[dof] = Some(eq);
        }

        (equations, count)
    }

    fn element_equations(&self, element: &Element, equations: &[Option<usize>]) -> [Option<usize>; 12] {
        let [i, j] = element.nodes();
        let (i, j) = (self.node_index[&i], self.node_index[&j]);
        std::array::from_fn(|k| {
            let node = if k < 6 { i } else { j };
            equations[node * 6 + k % 6]
        })
    }

    /// Element end displacements in global axes
    fn element_displacements(&self, element: &Element) -> Result<Vec12, SolverError> {
        let solution = self.solution.as_ref().ok_or(SolverError::NotAnalyzed)?;
        let [i, j] = element.nodes();
        let di = solution.displacements[self.node_index[&i]];
        let dj = solution.displacements[self.node_index[&j]];
        Ok(Vec12::from_fn(|k, _| if k < 6 { di[k] } else { dj[k - 6] }))
    }
}

fn csr_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let mut y = DVector::zeros(csr.nrows());
    for (row, lane) in csr.row_iter().enumerate() {
        y[row] = lane
            .col_indices()
            .iter()
            .zip(lane.values())
            .map(|(&col, &val)| val * x[col])
            .sum();
    }
    y
}

impl FeSolver for LinearStaticSolver {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn add_node(&mut self, id: NodeId, coords: [f64; 3]) -> Result<(), SolverError> {
        if self.node_index.contains_key(&id) {
            return Err(SolverError::DuplicateTag { kind: "node", id });
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(SolverNode {
            coords,
            fixed: [false; 6],
        });
        self.solution = None;
        Ok(())
    }

    fn add_transformation(
        &mut self,
        id: TransformationId,
        vecxz: [f64; 3],
    ) -> Result<(), SolverError> {
        if self.transformations.contains_key(&id) {
            return Err(SolverError::DuplicateTag { kind: "transformation", id });
        }
        self.transformations.insert(id, vecxz);
        Ok(())
    }

    fn add_elastic_section(
        &mut self,
        id: SectionId,
        section: ElasticSection,
    ) -> Result<(), SolverError> {
        if self.sections.contains_key(&id) {
            return Err(SolverError::DuplicateTag { kind: "section", id });
        }
        self.sections.insert(id, section);
        Ok(())
    }

    fn add_spring_material(&mut self, id: MaterialId, stiffness: f64) -> Result<(), SolverError> {
        if self.materials.contains_key(&id) {
            return Err(SolverError::DuplicateTag { kind: "material", id });
        }
        self.materials.insert(id, stiffness);
        Ok(())
    }

    fn add_beam(
        &mut self,
        id: ElementId,
        nodes: [NodeId; 2],
        section: SectionId,
        transformation: TransformationId,
    ) -> Result<(), SolverError> {
        let ci = self.node(nodes[0])?.coords;
        let cj = self.node(nodes[1])?.coords;
        let section = *self
            .sections
            .get(&section)
            .ok_or(SolverError::UnknownSection(section))?;
        let vecxz = *self
            .transformations
            .get(&transformation)
            .ok_or(SolverError::UnknownTransformation(transformation))?;

        let invalid = |reason: &str| SolverError::InvalidEntity {
            kind: "beam",
            id,
            reason: reason.to_string(),
        };
        let length = distance(ci, cj);
        let x = normalize(sub(cj, ci)).ok_or_else(|| invalid("zero length"))?;
        let y = normalize(cross(vecxz, x))
            .ok_or_else(|| invalid("vecxz is parallel to the element axis"))?;
        let z = cross(x, y);

        self.push_element(
            id,
            Element::Beam(BeamElement {
                nodes,
                section,
                axes: LocalAxes { x, y, z },
                length,
            }),
        )
    }

    fn add_zero_length(
        &mut self,
        id: ElementId,
        nodes: [NodeId; 2],
        springs: &[(MaterialId, Dof)],
        orientation: Orientation,
    ) -> Result<(), SolverError> {
        self.node(nodes[0])?;
        self.node(nodes[1])?;
        let springs = springs
            .iter()
            .map(|&(material, dof)| {
                self.materials
                    .get(&material)
                    .map(|&k| (k, dof))
                    .ok_or(SolverError::UnknownMaterial(material))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let invalid = || SolverError::InvalidEntity {
            kind: "zero-length element",
            id,
            reason: "degenerate orientation".to_string(),
        };
        let x = normalize(orientation.x).ok_or_else(invalid)?;
        let z = normalize(cross(x, orientation.yp)).ok_or_else(invalid)?;
        let y = cross(z, x);

        self.push_element(
            id,
            Element::ZeroLength(ZeroLengthElement {
                nodes,
                springs,
                axes: LocalAxes { x, y, z },
            }),
        )
    }

    fn add_equal_dof(
        &mut self,
        retained: NodeId,
        constrained: NodeId,
        dofs: &[Dof],
    ) -> Result<(), SolverError> {
        self.node(retained)?;
        self.node(constrained)?;
        self.equal_dofs.push((retained, constrained, dofs.to_vec()));
        self.solution = None;
        Ok(())
    }

    fn fix(&mut self, node: NodeId, restrained: [bool; 6]) -> Result<(), SolverError> {
        let index = *self
            .node_index
            .get(&node)
            .ok_or(SolverError::UnknownNode(node))?;
        let fixed = &mut self.nodes[index].fixed;
        for (flag, restrain) in fixed.iter_mut().zip(restrained) {
            *flag |= restrain;
        }
        self.solution = None;
        Ok(())
    }

    fn add_nodal_load(&mut self, node: NodeId, load: [f64; 6]) -> Result<(), SolverError> {
        self.node(node)?;
        let total = self.loads.entry(node).or_insert([0.0; 6]);
        for (t, l) in total.iter_mut().zip(load) {
            *t += l;
        }
        self.solution = None;
        Ok(())
    }

    fn analyze(&mut self, analysis: &StaticAnalysis) -> Result<(), SolverError> {
        let (equations, n_eq) = self.number_equations();
        debug!(
            "Solving {} equations for {} nodes and {} elements",
            n_eq,
            self.nodes.len(),
            self.elements.len()
        );

        let mut builder = SparseMatrixBuilder::new(n_eq);
        for (_, element) in &self.elements {
            let k_global = element.global_stiffness();
            let dofs = self.element_equations(element, &equations);
            builder.add_element_matrix::<12>(&dofs, &k_global);
        }
        let csr = builder.to_csr();

        let mut reference = DVector::<f64>::zeros(n_eq);
        for (node, load) in &self.loads {
            let n = self.node_index[node];
            for (d, value) in load.iter().enumerate() {
                if let Some(eq) = equations[n * 6 + d] {
                    reference[eq] += value;
                }
            }
        }

        let perm = reverse_cuthill_mckee(&csr);
        let new_index = inverse_permutation(&perm);
        let mut cholesky = SparseCholeskySolver::new(&csr, &new_index);
        debug!("Profile bandwidth after RCM: {}", cholesky.bandwidth());
        cholesky.factorize().map_err(SolverError::Factorization)?;

        let steps = analysis.steps.max(1);
        let mut u = DVector::<f64>::zeros(n_eq);
        for step in 1..=steps {
            let lambda = step as f64 / steps as f64;
            let mut iterations = 0;
            loop {
                let residual = &reference * lambda - csr_matvec(&csr, &u);
                let rhs = DVector::from_fn(n_eq, |i, _| residual[perm[i]]);
                let du = cholesky.solve(&rhs).map_err(SolverError::Backend)?;
                for k in 0..n_eq {
                    u[k] += du[new_index[k]];
                }
                iterations += 1;

                let norm = du.norm();
                if norm < analysis.tolerance {
                    break;
                }
                if iterations >= analysis.max_iterations {
                    return Err(SolverError::NotConverged {
                        step,
                        iterations,
                        norm,
                    });
                }
            }
        }

        let displacements = (0..self.nodes.len())
            .map(|n| std::array::from_fn(|d| equations[n * 6 + d].map_or(0.0, |eq| u[eq])))
            .collect();
        self.solution = Some(Solution { displacements });
        Ok(())
    }

    fn node_displacement(&self, node: NodeId) -> Result<[f64; 6], SolverError> {
        let index = *self
            .node_index
            .get(&node)
            .ok_or(SolverError::UnknownNode(node))?;
        let solution = self.solution.as_ref().ok_or(SolverError::NotAnalyzed)?;
        Ok(solution.displacements[index])
    }

    fn node_coord(&self, node: NodeId) -> Result<[f64; 3], SolverError> {
        Ok(self.node(node)?.coords)
    }

    fn element_nodes(&self, element: ElementId) -> Result<[NodeId; 2], SolverError> {
        Ok(self.element(element)?.nodes())
    }

    fn element_local_forces(&self, element: ElementId) -> Result<LocalEndForces, SolverError> {
        let element = self.element(element)?;
        let d_global = self.element_displacements(element)?;
        match element {
            Element::Beam(beam) => {
                let s = &beam.section;
                let k_local = member_local_stiffness(s.e, s.g, s.a, s.iy, s.iz, s.j, beam.length);
                let forces = k_local * transformation(&beam.axes) * d_global;
                Ok(LocalEndForces::Frame(std::array::from_fn(|k| forces[k])))
            }
            Element::ZeroLength(spring) => {
                // basic force of the first spring
                let force = spring
                    .springs
                    .first()
                    .map_or(0.0, |&(k, dof)| k * spring_vector(&spring.axes, dof).dot(&d_global));
                Ok(LocalEndForces::Axial(force))
            }
        }
    }

    fn element_local_axes(&self, element: ElementId) -> Result<LocalAxes, SolverError> {
        Ok(self.element(element)?.axes())
    }
}
