//! Finite-element solver session.
//!
//! The assembler and the result reconstructor talk to the solver only through
//! [`FeSolver`]. A session owns one model at a time; callers that need
//! concurrent analyses create one session each.

pub mod linear;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::elements::{Dof, ElementId, MaterialId, NodeId, SectionId};

pub use linear::LinearStaticSolver;

/// Tag of a geometric transformation
pub type TransformationId = u64;

/// Errors reported by a solver session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Unknown element {0}")]
    UnknownElement(ElementId),

    #[error("Unknown section {0}")]
    UnknownSection(SectionId),

    #[error("Unknown transformation {0}")]
    UnknownTransformation(TransformationId),

    #[error("Unknown material {0}")]
    UnknownMaterial(MaterialId),

    #[error("Duplicate {kind} tag {id}")]
    DuplicateTag { kind: &'static str, id: u64 },

    #[error("Invalid {kind} {id}: {reason}")]
    InvalidEntity {
        kind: &'static str,
        id: u64,
        reason: String,
    },

    #[error("No convergence at load step {step} after {iterations} iterations (displacement increment norm {norm:e})")]
    NotConverged {
        step: usize,
        iterations: usize,
        norm: f64,
    },

    #[error("Factorization failed: {0}")]
    Factorization(String),

    #[error("No analysis results available")]
    NotAnalyzed,

    #[error("{0}")]
    Backend(String),
}

impl SolverError {
    /// Fatal linear-algebra failures (singular or indefinite system)
    pub fn is_numerical(&self) -> bool {
        match self {
            SolverError::Factorization(_) => true,
            SolverError::Backend(message) => {
                let message = message.to_ascii_lowercase();
                ["illegal value", "dpbsv", "singular"]
                    .iter()
                    .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }
}

/// Elastic frame section constants in solver units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticSection {
    pub e: f64,
    pub a: f64,
    pub iz: f64,
    pub iy: f64,
    pub g: f64,
    pub j: f64,
}

/// Orientation triad of a zero-length element: local x and a vector in the local x-y plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: [f64; 3],
    pub yp: [f64; 3],
}

impl Orientation {
    /// Springs act along the global axes
    pub const GLOBAL: Orientation = Orientation {
        x: [1.0, 0.0, 0.0],
        yp: [0.0, 1.0, 0.0],
    };
}

/// Incremental static analysis parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticAnalysis {
    /// Number of equal load-control increments
    pub steps: usize,
    /// Convergence limit on the norm of the displacement increment
    pub tolerance: f64,
    /// Newton iterations allowed per step
    pub max_iterations: usize,
}

impl Default for StaticAnalysis {
    fn default() -> Self {
        Self {
            steps: 10,
            tolerance: 1e-5,
            max_iterations: 50,
        }
    }
}

/// Element end forces in local axes, acting on the element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalEndForces {
    /// Axial-only element: `[N]`
    Axial(f64),
    /// Frame element: `[N, Vy, Vz, T, My, Mz]` at end i then end j
    Frame([f64; 12]),
}

/// Local axes of an element, unit vectors in the solver frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalAxes {
    pub x: [f64; 3],
    pub y: [f64; 3],
    pub z: [f64; 3],
}

/// Operations of a 3D, six-DOF-per-node finite-element solver session
pub trait FeSolver {
    /// Discard the current model and start an empty one
    fn reset(&mut self);

    fn add_node(&mut self, id: NodeId, coords: [f64; 3]) -> Result<(), SolverError>;

    /// Linear transformation whose local x-z plane contains `vecxz`
    fn add_transformation(
        &mut self,
        id: TransformationId,
        vecxz: [f64; 3],
    ) -> Result<(), SolverError>;

    fn add_elastic_section(
        &mut self,
        id: SectionId,
        section: ElasticSection,
    ) -> Result<(), SolverError>;

    /// Uniaxial elastic material
    fn add_spring_material(&mut self, id: MaterialId, stiffness: f64) -> Result<(), SolverError>;

    fn add_beam(
        &mut self,
        id: ElementId,
        nodes: [NodeId; 2],
        section: SectionId,
        transformation: TransformationId,
    ) -> Result<(), SolverError>;

    /// Coincident-node element with one spring per listed direction
    fn add_zero_length(
        &mut self,
        id: ElementId,
        nodes: [NodeId; 2],
        springs: &[(MaterialId, Dof)],
        orientation: Orientation,
    ) -> Result<(), SolverError>;

    /// Tie `dofs` of `constrained` to the same DOFs of `retained`
    fn add_equal_dof(
        &mut self,
        retained: NodeId,
        constrained: NodeId,
        dofs: &[Dof],
    ) -> Result<(), SolverError>;

    fn fix(&mut self, node: NodeId, restrained: [bool; 6]) -> Result<(), SolverError>;

    /// Reference nodal load, scaled by the load factor during the analysis
    fn add_nodal_load(&mut self, node: NodeId, load: [f64; 6]) -> Result<(), SolverError>;

    fn analyze(&mut self, analysis: &StaticAnalysis) -> Result<(), SolverError>;

    fn node_displacement(&self, node: NodeId) -> Result<[f64; 6], SolverError>;

    fn node_coord(&self, node: NodeId) -> Result<[f64; 3], SolverError>;

    fn element_nodes(&self, element: ElementId) -> Result<[NodeId; 2], SolverError>;

    fn element_local_forces(&self, element: ElementId) -> Result<LocalEndForces, SolverError>;

    fn element_local_axes(&self, element: ElementId) -> Result<LocalAxes, SolverError>;
}
