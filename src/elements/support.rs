//! Support conditions

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Boundary condition identifier
pub type BoundaryId = u64;

/// How a boundary condition holds its target nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Per-DOF spring stiffness to a fixed ground node
    Elastic,
    /// Per-DOF fixity flags (0 = free, 1 = restrained)
    #[serde(other)]
    Rigid,
}

impl From<&str> for BoundaryKind {
    fn from(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("elastic") {
            BoundaryKind::Elastic
        } else {
            BoundaryKind::Rigid
        }
    }
}

/// Support applied to a set of nodes, with one value per DOF in the external frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub id: BoundaryId,
    pub targets: Vec<NodeId>,
    #[serde(rename = "type")]
    pub kind: BoundaryKind,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default)]
    pub dz: f64,
    #[serde(default)]
    pub rx: f64,
    #[serde(default)]
    pub ry: f64,
    #[serde(default)]
    pub rz: f64,
}

impl BoundaryCondition {
    /// All six DOFs restrained
    pub fn fixed(id: BoundaryId, targets: Vec<NodeId>) -> Self {
        Self::rigid(id, targets, [true; 6])
    }

    /// Translations restrained, rotations free
    pub fn pinned(id: BoundaryId, targets: Vec<NodeId>) -> Self {
        Self::rigid(id, targets, [true, true, true, false, false, false])
    }

    pub fn rigid(id: BoundaryId, targets: Vec<NodeId>, restrained: [bool; 6]) -> Self {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Self {
            id,
            targets,
            kind: BoundaryKind::Rigid,
            dx: flag(restrained[0]),
            dy: flag(restrained[1]),
            dz: flag(restrained[2]),
            rx: flag(restrained[3]),
            ry: flag(restrained[4]),
            rz: flag(restrained[5]),
        }
    }

    /// Spring support with stiffness [kx, ky, kz, krx, kry, krz]
    pub fn elastic(id: BoundaryId, targets: Vec<NodeId>, stiffness: [f64; 6]) -> Self {
        Self {
            id,
            targets,
            kind: BoundaryKind::Elastic,
            dx: stiffness[0],
            dy: stiffness[1],
            dz: stiffness[2],
            rx: stiffness[3],
            ry: stiffness[4],
            rz: stiffness[5],
        }
    }

    /// Raw per-DOF values [dx, dy, dz, rx, ry, rz]
    pub fn values(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Fixity flags of a rigid condition; any non-zero value restrains the DOF
    pub fn restraints(&self) -> [bool; 6] {
        self.values().map(|v| v != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_and_pinned() {
        assert_eq!(BoundaryCondition::fixed(1, vec![1]).restraints(), [true; 6]);
        assert_eq!(
            BoundaryCondition::pinned(2, vec![1]).restraints(),
            [true, true, true, false, false, false]
        );
    }

    #[test]
    fn test_kind_from_document() {
        let json = r#"{"id": 1, "targets": [4, 5], "type": "pinned",
                       "dx": 1, "dy": 1, "dz": 1, "rx": 0, "ry": 0, "rz": 0}"#;
        let bc: BoundaryCondition = serde_json::from_str(json).unwrap();
        assert_eq!(bc.kind, BoundaryKind::Rigid);
        assert_eq!(bc.targets, vec![4, 5]);

        let json = r#"{"id": 2, "targets": [4], "type": "elastic", "dz": 1.5e6}"#;
        let bc: BoundaryCondition = serde_json::from_str(json).unwrap();
        assert_eq!(bc.kind, BoundaryKind::Elastic);
        assert_eq!(bc.values(), [0.0, 0.0, 1.5e6, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(BoundaryKind::from("Elastic"), BoundaryKind::Elastic);
        assert_eq!(BoundaryKind::from("roller"), BoundaryKind::Rigid);
    }
}
