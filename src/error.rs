//! Error types for lineage layout operations.
//!
//! Every fallible operation in the crate returns [`LayoutError`]. Layout
//! errors are fatal for the call that raised them: no partial result is
//! produced and the engine's retained state is left untouched.

use thiserror::Error;

use crate::graph::NodeId;

/// The main error type for graph mutation and layout computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A node lacks an attribute the layout needs.
    #[error("{node} is missing required attribute `{attribute}`")]
    MissingAttribute {
        node: NodeId,
        attribute: &'static str,
    },

    /// A node carries a timestamp that cannot be ordered into a row.
    #[error("{node} has a non-finite timestamp ({value})")]
    InvalidTimestamp { node: NodeId, value: f64 },

    #[error("{0} is not part of the graph")]
    UnknownNode(NodeId),

    /// Links are undirected temporal links between distinct objects.
    #[error("self-loop on {node} rejected")]
    SelfLoop { node: NodeId },

    /// The branch splitter returned something that is not a partition of the track.
    #[error("branch invariant violated in track {track}: {kind}")]
    InvariantViolation { track: usize, kind: BranchViolation },

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

/// How a splitter's output failed to partition its track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BranchViolation {
    #[error("{0} appears in more than one branch")]
    Overlap(NodeId),

    #[error("{0} is not assigned to any branch")]
    Missing(NodeId),

    #[error("{0} does not belong to the track")]
    Foreign(NodeId),
}
