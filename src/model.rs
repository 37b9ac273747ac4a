//! Frame model document - the user's coarse description of a structure

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::elements::{
    BoundaryCondition, Member, MemberId, Node, NodeId, Section, SectionId,
    SectionPropertyService, SectionShape,
};
use crate::error::{FrameError, FrameResult};
use crate::loads::{Load, LoadKind};
use crate::mesh::resolve_axes;

/// The structural model as supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameModel {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryCondition>,
    #[serde(default)]
    pub loads: Vec<Load>,
}

impl FrameModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    pub fn add_node(&mut self, node: Node) -> FrameResult<()> {
        if self.node(node.id).is_some() {
            return Err(FrameError::DuplicateId { kind: "node", id: node.id });
        }
        check_node(&node)?;
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_section(&mut self, section: Section) -> FrameResult<()> {
        if self.section(section.id).is_some() {
            return Err(FrameError::DuplicateId { kind: "section", id: section.id });
        }
        section
            .shape
            .validate()
            .and_then(|_| section.material.validate())
            .map_err(|reason| FrameError::InvalidSection { section: section.id, reason })?;
        self.sections.push(section);
        Ok(())
    }

    /// Add a member; its nodes and section must already be in the model
    pub fn add_member(&mut self, member: Member) -> FrameResult<()> {
        if self.member(member.id).is_some() {
            return Err(FrameError::DuplicateId { kind: "member", id: member.id });
        }
        self.check_member(&member)?;
        self.members.push(member);
        Ok(())
    }

    pub fn add_boundary_condition(&mut self, bc: BoundaryCondition) -> FrameResult<()> {
        if self.boundary_conditions.iter().any(|b| b.id == bc.id) {
            return Err(FrameError::DuplicateId { kind: "boundary condition", id: bc.id });
        }
        self.check_boundary_condition(&bc)?;
        self.boundary_conditions.push(bc);
        Ok(())
    }

    pub fn add_load(&mut self, load: Load) -> FrameResult<()> {
        if self.loads.iter().any(|l| l.id == load.id) {
            return Err(FrameError::DuplicateId { kind: "load", id: load.id });
        }
        self.check_load(&load)?;
        self.loads.push(load);
        Ok(())
    }

    // ========================
    // Lookups
    // ========================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// End coordinates of a member
    pub fn member_ends(&self, member: &Member) -> FrameResult<([f64; 3], [f64; 3])> {
        let owner = || format!("Member {}", member.id);
        let start = self.node(member.i_node).ok_or_else(|| FrameError::UndefinedNode {
            node: member.i_node,
            owner: owner(),
        })?;
        let end = self.node(member.j_node).ok_or_else(|| FrameError::UndefinedNode {
            node: member.j_node,
            owner: owner(),
        })?;
        Ok((start.coords(), end.coords()))
    }

    // ========================
    // Validation
    // ========================

    fn check_member(&self, member: &Member) -> FrameResult<()> {
        let (start, end) = self.member_ends(member)?;
        if self.section(member.section).is_none() {
            return Err(FrameError::UndefinedSection {
                section: member.section,
                member: member.id,
            });
        }
        resolve_axes(start, end, member.reference).map_err(|err| match err {
            FrameError::InvalidGeometry(reason) => {
                FrameError::InvalidGeometry(format!("member {}: {}", member.id, reason))
            }
            other => other,
        })?;
        Ok(())
    }

    fn check_boundary_condition(&self, bc: &BoundaryCondition) -> FrameResult<()> {
        for &target in &bc.targets {
            if self.node(target).is_none() {
                return Err(FrameError::UndefinedNode {
                    node: target,
                    owner: format!("Boundary condition {}", bc.id),
                });
            }
        }
        Ok(())
    }

    fn check_load(&self, load: &Load) -> FrameResult<()> {
        let owner = || format!("Load {}", load.id);
        for &target in &load.targets {
            match load.kind {
                LoadKind::Nodal if self.node(target).is_none() => {
                    return Err(FrameError::UndefinedNode { node: target, owner: owner() });
                }
                LoadKind::Linear if self.member(target).is_none() => {
                    return Err(FrameError::UndefinedMember { member: target, owner: owner() });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Check ids, references, member geometry and section shapes.
    ///
    /// Runs before anything is handed to a solver.
    pub fn validate(&self) -> FrameResult<()> {
        fn unique<'a>(
            kind: &'static str,
            ids: impl Iterator<Item = &'a u64>,
        ) -> FrameResult<()> {
            let mut seen = HashSet::new();
            for &id in ids {
                if !seen.insert(id) {
                    return Err(FrameError::DuplicateId { kind, id });
                }
            }
            Ok(())
        }

        unique("node", self.nodes.iter().map(|n| &n.id))?;
        unique("member", self.members.iter().map(|m| &m.id))?;
        unique("section", self.sections.iter().map(|s| &s.id))?;
        unique("boundary condition", self.boundary_conditions.iter().map(|b| &b.id))?;
        unique("load", self.loads.iter().map(|l| &l.id))?;

        for node in &self.nodes {
            check_node(node)?;
        }
        for section in &self.sections {
            section
                .shape
                .validate()
                .and_then(|_| section.material.validate())
                .map_err(|reason| FrameError::InvalidSection { section: section.id, reason })?;
        }
        for member in &self.members {
            self.check_member(member)?;
        }
        for bc in &self.boundary_conditions {
            self.check_boundary_condition(bc)?;
        }
        for load in &self.loads {
            self.check_load(load)?;
        }
        Ok(())
    }

    /// Validate and additionally run every section through `service`
    pub fn validate_with(&self, service: &dyn SectionPropertyService) -> FrameResult<()> {
        self.validate()?;
        for section in &self.sections {
            service
                .properties(&section.shape, &section.material)
                .map_err(|reason| FrameError::InvalidSection { section: section.id, reason })?;
        }
        Ok(())
    }

    // ========================
    // Serialization
    // ========================

    /// Parse a model document.
    ///
    /// An unknown section `type` is reported as an invalid section rather than
    /// a generic parse failure.
    pub fn from_json(json: &str) -> FrameResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(sections) = value.get("sections").and_then(|s| s.as_array()) {
            for section in sections {
                let id = section.get("id").and_then(|id| id.as_u64()).unwrap_or_default();
                let kind = section.get("type").and_then(|t| t.as_str());
                match kind {
                    Some(kind) if SectionShape::TYPE_NAMES.contains(&kind) => {}
                    Some(kind) => {
                        return Err(FrameError::InvalidSection {
                            section: id,
                            reason: format!("unknown section type '{}'", kind),
                        })
                    }
                    None => {
                        return Err(FrameError::InvalidSection {
                            section: id,
                            reason: "missing section type".to_string(),
                        })
                    }
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Full model listing for offline inspection of a failed solve
    pub fn diagnostic_dump(&self) -> String {
        let materials: Vec<_> = self
            .sections
            .iter()
            .map(|s| serde_json::json!({ "section": s.id, "material": s.material }))
            .collect();
        let dump = serde_json::json!({
            "nodes": self.nodes,
            "members": self.members,
            "materials": materials,
            "sections": self.sections,
            "boundary_conditions": self.boundary_conditions,
            "loads": self.loads,
        });
        serde_json::to_string_pretty(&dump).unwrap_or_else(|err| format!("<unserializable model: {}>", err))
    }
}

fn check_node(node: &Node) -> FrameResult<()> {
    if node.coords().iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(FrameError::InvalidGeometry(format!(
            "node {} has non-finite coordinates {:?}",
            node.id,
            node.coords()
        )))
    }
}
