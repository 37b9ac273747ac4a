//! Error types for the frame analysis pipeline

use thiserror::Error;

use crate::elements::{MemberId, NodeId, SectionId};
use crate::solver::SolverError;

/// Main error type for frame analysis operations
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("{owner} references undefined node {node}")]
    UndefinedNode { node: NodeId, owner: String },

    #[error("{owner} references undefined member {member}")]
    UndefinedMember { member: MemberId, owner: String },

    #[error("Member {member} references undefined section {section}")]
    UndefinedSection { section: SectionId, member: MemberId },

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: SectionId, reason: String },

    #[error("Analysis failed to converge: {0}")]
    SolverNonConvergence(String),

    #[error("Solver numerical error: {0}")]
    SolverNumerical(String),

    #[error("Solver error: {0}")]
    Solver(SolverError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FrameError {
    /// True for errors raised by a reference to an id the model does not define
    pub fn is_invalid_reference(&self) -> bool {
        matches!(
            self,
            FrameError::UndefinedNode { .. }
                | FrameError::UndefinedMember { .. }
                | FrameError::UndefinedSection { .. }
        )
    }
}

impl From<SolverError> for FrameError {
    fn from(err: SolverError) -> Self {
        if err.is_numerical() {
            return FrameError::SolverNumerical(err.to_string());
        }
        match err {
            SolverError::NotConverged { .. } => FrameError::SolverNonConvergence(err.to_string()),
            other => FrameError::Solver(other),
        }
    }
}

/// Result type for frame analysis operations
pub type FrameResult<T> = Result<T, FrameError>;
