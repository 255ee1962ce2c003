//! Node type and related structures.
//!
//! Nodes are detected objects at a time instant. Each node has:
//! - A stable unique identifier (survives graph mutations)
//! - A timestamp locating it on the time axis (may be absent)
//! - A size used to scale its cell
//! - A display label

use std::fmt;

use serde::Serialize;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop. The ordering
/// of ids is the tie-break used everywhere the layout needs a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Per-node attributes read by the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttributes {
    /// Time instant of the detection. Required by the layout.
    pub timestamp: Option<f64>,
    /// Object size (radius) in physical units.
    pub size: f64,
    /// Display name.
    pub label: String,
}

impl NodeAttributes {
    /// Create attributes for a node detected at `timestamp`.
    pub fn new(timestamp: f64, size: f64, label: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp),
            size,
            label: label.into(),
        }
    }

    /// Attributes with no timestamp yet.
    pub fn untimed(size: f64, label: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            size,
            label: label.into(),
        }
    }
}

/// Node payload stored in the graph: the stable id plus its attributes.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) id: NodeId,
    pub(crate) attributes: NodeAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_id_ordering() {
        let mut ids = vec![NodeId(5), NodeId(1), NodeId(3)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(1), NodeId(3), NodeId(5)]);
    }

    #[test]
    fn test_attributes() {
        let attrs = NodeAttributes::new(2.5, 4.0, "spot");
        assert_eq!(attrs.timestamp, Some(2.5));
        assert_eq!(attrs.label, "spot");

        let untimed = NodeAttributes::untimed(1.0, "ghost");
        assert!(untimed.timestamp.is_none());
    }
}
