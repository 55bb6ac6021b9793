//! Error types for scan alignment.

use thiserror::Error;

/// Result type for alignment operations.
pub type AlignResult<T> = Result<T, AlignError>;

/// Errors raised while building or applying an alignment transform.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignError {
    /// A direction vector or triangle normal has (near) zero length.
    #[error("degenerate input: {reason}")]
    DegenerateInput {
        /// What was degenerate.
        reason: String,
    },

    /// An operator needs a different number of selected vertices.
    #[error("invalid selection: need exactly {required} vertices, got {actual}")]
    InvalidSelection {
        /// Number of vertices the operator requires.
        required: usize,
        /// Number of vertices currently selected.
        actual: usize,
    },

    /// A selected vertex index does not exist in the mesh.
    #[error("vertex index {index} out of range (mesh has {count} vertices)")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of addressable vertices.
        count: usize,
    },

    /// A tolerance in [`crate::AlignConfig`] is negative or not finite.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which tolerance was rejected.
        reason: String,
    },

    /// The computed rotation block is not orthonormal.
    #[error("rotation block is not orthonormal")]
    NotRigid,

    /// The STL data could not be parsed.
    #[error("failed to parse STL: {0}")]
    StlParse(String),
}

impl AlignError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }
}
