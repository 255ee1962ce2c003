//! Edge type and related structures.
//!
//! Edges are undirected temporal links between two detections. Each edge has:
//! - A stable unique identifier
//! - Two endpoint node IDs (stored low id first)
//! - A weight (the linking cost)

use std::fmt;

use serde::Serialize;

use super::node::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Edge payload stored in the graph.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeData {
    pub(crate) id: EdgeId,
    pub(crate) weight: f64,
}

/// A read-only view of one edge: endpoints normalised so `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl EdgeView {
    pub(crate) fn new(id: EdgeId, a: NodeId, b: NodeId, weight: f64) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id,
            source,
            target,
            weight,
        }
    }
}
