//! Member element - 3D frame element (beam/column) and its mesh

use serde::{Deserialize, Deserializer, Serialize};

use super::{NodeId, SectionId};

/// Member identifier. Sub-members draw from the same element id space.
pub type MemberId = u64;

/// Named end-release pattern of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleasePattern {
    /// No hinge at either end
    #[default]
    Rigid,
    /// Rotations released at the j-end
    FixedPinned,
    /// Rotations released at the i-end
    PinnedFixed,
    /// Rotations released at both ends
    PinnedPinned,
}

impl ReleasePattern {
    /// DOF release map [DX, DY, DZ, RX, RY, RZ] for the (i, j) ends
    pub fn end_releases(self) -> ([bool; 6], [bool; 6]) {
        const NONE: [bool; 6] = [false; 6];
        const ROTATIONS: [bool; 6] = [false, false, false, true, true, true];
        match self {
            ReleasePattern::Rigid => (NONE, NONE),
            ReleasePattern::FixedPinned => (NONE, ROTATIONS),
            ReleasePattern::PinnedFixed => (ROTATIONS, NONE),
            ReleasePattern::PinnedPinned => (ROTATIONS, ROTATIONS),
        }
    }
}

impl From<&str> for ReleasePattern {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fixed-pinned" => ReleasePattern::FixedPinned,
            "pinned-fixed" => ReleasePattern::PinnedFixed,
            "pinned-pinned" => ReleasePattern::PinnedPinned,
            _ => ReleasePattern::Rigid,
        }
    }
}

impl<'de> Deserialize<'de> for ReleasePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.as_deref().map(ReleasePattern::from).unwrap_or_default())
    }
}

/// A 3D frame member (beam or column) between two user nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Start node
    #[serde(rename = "nodei")]
    pub i_node: NodeId,
    /// End node
    #[serde(rename = "nodej")]
    pub j_node: NodeId,
    pub section: SectionId,
    /// Explicit local-z reference vector in the external frame
    #[serde(rename = "vecxz", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<[f64; 3]>,
    #[serde(default)]
    pub release: ReleasePattern,
}

impl Member {
    pub fn new(id: MemberId, i_node: NodeId, j_node: NodeId, section: SectionId) -> Self {
        Self {
            id,
            i_node,
            j_node,
            section,
            reference: None,
            release: ReleasePattern::Rigid,
        }
    }

    /// Set the local-z reference vector
    pub fn with_reference(mut self, reference: [f64; 3]) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set the end-release pattern
    pub fn with_release(mut self, release: ReleasePattern) -> Self {
        self.release = release;
        self
    }
}

/// Ordered sub-node of a member mesh, in the external frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub id: NodeId,
    pub coords: [f64; 3],
}

/// Solver beam element created for one mesh segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubMember {
    pub id: MemberId,
    /// Solver end nodes; differs from the mesh nodes at a released end
    pub nodes: [NodeId; 2],
    pub section: SectionId,
}

/// Discretized member: `members[k]` spans `nodes[k]` to `nodes[k + 1]`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub nodes: Vec<MeshNode>,
    pub members: Vec<SubMember>,
    pub length: f64,
}

impl Mesh {
    pub fn segment_count(&self) -> usize {
        self.members.len()
    }

    /// Mesh nodes strictly between the member ends
    pub fn interior_nodes(&self) -> &[MeshNode] {
        if self.nodes.len() < 2 {
            return &[];
        }
        &self.nodes[1..self.nodes.len() - 1]
    }
}
