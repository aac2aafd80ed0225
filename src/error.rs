//! Error types for the snap engine

use crate::gfx::scene::NodeId;
use thiserror::Error;

/// Snap engine errors
///
/// A missed raycast is not an error: it is modelled as `Option::None` and
/// handled by the pointer's resting pose.
#[derive(Debug, Error)]
pub enum SnapError {
    /// Drag attempted on something that cannot be dragged (the construction
    /// plane, a container, a snap marker)
    #[error("Node cannot be dragged: {0:?}")]
    InvalidDragTarget(NodeId),

    /// A snap candidate outlived the node it was taken from
    #[error("Snap point refers to a destroyed node: {0:?}")]
    OrphanedSnapReference(NodeId),

    /// Handle does not resolve to a live node
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// A programming error in the caller or the engine itself
    #[error("Engine invariant violated: {0}")]
    InvariantViolation(String),

    /// Scan roots handed to the engine are unusable
    #[error("Invalid scene layout: {0}")]
    InvalidLayout(String),

    /// OBJ import failed
    #[error("Failed to load OBJ file {path}: {source}")]
    ObjLoad {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
}

/// Result type for snap engine operations
pub type Result<T> = std::result::Result<T, SnapError>;
