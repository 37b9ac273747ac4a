//! Member meshing: local axes, subdivision, end releases and id allocation

pub mod axes;
pub mod discretize;
pub mod ids;
pub mod releases;

pub use axes::{default_reference, resolve_axes, MemberAxes};
pub use discretize::{discretize, segment_count};
pub use ids::IdAllocator;
pub use releases::{release_stiffness, synthesize_release, ReleaseHardware};

/// Allocators for every solver namespace touched while meshing
#[derive(Debug, Clone, Default)]
pub struct IdSpace {
    /// Sub-nodes, release nodes and ground nodes
    pub nodes: IdAllocator,
    /// Sub-members and zero-length elements
    pub elements: IdAllocator,
    /// Spring materials
    pub materials: IdAllocator,
}
