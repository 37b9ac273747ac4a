//! Structural elements module

mod material;
mod member;
mod node;
mod section;
mod support;

pub use material::Material;
pub use member::{Member, MemberId, Mesh, MeshNode, ReleasePattern, SubMember};
pub use node::{Dof, Node, NodeId};
pub use section::{
    Section, SectionId, SectionProperties, SectionPropertyService, SectionShape, StandardSections,
};
pub use support::{BoundaryCondition, BoundaryId, BoundaryKind};

/// Solver element identifier (beams and zero-length elements)
pub type ElementId = u64;

/// Solver uniaxial material identifier
pub type MaterialId = u64;
