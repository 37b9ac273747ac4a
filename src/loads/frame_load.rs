//! Loads of the user model

use serde::{Deserialize, Serialize};

/// Load identifier
pub type LoadId = u64;

/// Where a load acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    /// Concentrated force on nodes (kN)
    Nodal,
    /// Force per length along members (kN/m)
    Linear,
    /// Any other kind; carried through the document but not applied
    #[serde(other)]
    Unsupported,
}

/// Force vector in the external frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LoadVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// A global load on nodes or members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub id: LoadId,
    #[serde(rename = "type")]
    pub kind: LoadKind,
    /// Node ids for nodal loads, member ids for linear loads
    pub targets: Vec<u64>,
    pub value: LoadVector,
}

impl Load {
    /// Concentrated force on each target node
    pub fn nodal(id: LoadId, targets: Vec<u64>, value: LoadVector) -> Self {
        Self { id, kind: LoadKind::Nodal, targets, value }
    }

    /// Uniform force per length along each target member
    pub fn linear(id: LoadId, targets: Vec<u64>, value: LoadVector) -> Self {
        Self { id, kind: LoadKind::Linear, targets, value }
    }
}
