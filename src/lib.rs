//! Frame FEA - 3D frame analysis with reconstructed internal-force diagrams
//!
//! Takes a coarse structural model (nodes, members, sections, supports and
//! loads), meshes every member into short sub-members, emulates end releases
//! with soft springs, solves the linear static problem and reads back the
//! section forces N, Vy, Vz, T, My and Mz along each member, ready for
//! plotting as diagrams.
//!
//! ## Example
//! ```rust
//! use frame_fea::prelude::*;
//!
//! let mut model = FrameModel::new();
//! model.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
//! model.add_node(Node::new(2, 2.0, 0.0, 0.0)).unwrap();
//! model
//!     .add_section(Section::rectangular(1, 300.0, 500.0, Material::steel()))
//!     .unwrap();
//! model.add_member(Member::new(1, 1, 2, 1)).unwrap();
//! model.add_boundary_condition(BoundaryCondition::fixed(1, vec![1])).unwrap();
//! model
//!     .add_load(Load::nodal(1, vec![2], LoadVector::new(0.0, 0.0, -10.0)))
//!     .unwrap();
//!
//! let mut solver = LinearStaticSolver::new();
//! let result = run_analysis(&model, &mut solver, &AnalysisOptions::default()).unwrap();
//!
//! let fixed_end = &result.member(1).unwrap().node_efforts[0];
//! assert_eq!(fixed_end.efforts.my.value, 20.0);
//! ```

pub mod analysis;
pub mod assembler;
pub mod elements;
pub mod error;
pub mod forces;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod model;
pub mod results;
pub mod solver;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{run_analysis, run_analysis_with, AnalysisOptions};
    pub use crate::elements::{
        BoundaryCondition, BoundaryKind, Material, Member, Node, ReleasePattern, Section,
        SectionShape, StandardSections,
    };
    pub use crate::error::{FrameError, FrameResult};
    pub use crate::forces::ForceComponent;
    pub use crate::loads::{ElementLoad, Load, LoadKind, LoadVector};
    pub use crate::model::FrameModel;
    pub use crate::results::{AnalysisResult, MemberResult, NodeDisplacement, NodeEffort};
    pub use crate::solver::{FeSolver, LinearStaticSolver};
}
