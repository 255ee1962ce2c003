//! TrackGraph - the temporal tracking graph consumed by the layout.
//!
//! The TrackGraph stores detections and their undirected temporal links using
//! petgraph's StableGraph, so that node and edge identities survive removals.
//! Every enumeration it exposes is sorted by stable id: the layout never
//! depends on hash or slot iteration order.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};

use super::edge::{EdgeData, EdgeId, EdgeView};
use super::node::{NodeAttributes, NodeData, NodeId};
use crate::error::LayoutError;

/// The tracking graph.
///
/// This struct manages:
/// - Graph topology via petgraph (undirected, weighted)
/// - Per-node attributes (timestamp, size, label)
/// - ID mapping between stable IDs and internal indices
#[derive(Debug, Clone)]
pub struct TrackGraph {
    /// The underlying graph structure.
    graph: StableGraph<NodeData, EdgeData, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,
}

impl TrackGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with the given attributes.
    pub fn add_node(&mut self, attributes: NodeAttributes) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(NodeData { id, attributes });
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Remove a node and all its links.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        let incident: Vec<EdgeId> = self.graph.edges(index).map(|e| e.weight().id).collect();
        for edge_id in incident {
            self.edge_id_to_index.remove(&edge_id);
        }

        self.graph.remove_node(index);
        true
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the upper bound on node slots (max slot + 1).
    ///
    /// May be larger than node_count() if nodes have been removed,
    /// since StableGraph preserves index stability.
    pub fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Dense slot of a node, in `0..node_bound()`.
    pub fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_id_to_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get a node's attributes.
    pub fn attributes(&self, id: NodeId) -> Option<&NodeAttributes> {
        let index = self.node_id_to_index.get(&id)?;
        self.graph.node_weight(*index).map(|data| &data.attributes)
    }

    /// Get a node's timestamp, if the node exists and has one.
    pub fn timestamp(&self, id: NodeId) -> Option<f64> {
        self.attributes(id).and_then(|attrs| attrs.timestamp)
    }

    /// Set or clear a node's timestamp.
    pub fn set_timestamp(&mut self, id: NodeId, timestamp: Option<f64>) -> Result<(), LayoutError> {
        self.attributes_mut(id)?.timestamp = timestamp;
        Ok(())
    }

    /// Set a node's size.
    pub fn set_size(&mut self, id: NodeId, size: f64) -> Result<(), LayoutError> {
        self.attributes_mut(id)?.size = size;
        Ok(())
    }

    /// Set a node's label.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<(), LayoutError> {
        self.attributes_mut(id)?.label = label.into();
        Ok(())
    }

    fn attributes_mut(&mut self, id: NodeId) -> Result<&mut NodeAttributes, LayoutError> {
        let index = *self
            .node_id_to_index
            .get(&id)
            .ok_or(LayoutError::UnknownNode(id))?;
        self.graph
            .node_weight_mut(index)
            .map(|data| &mut data.attributes)
            .ok_or(LayoutError::UnknownNode(id))
    }

    /// Get the neighbors of a node in ascending id order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors(index)
            .filter_map(|n| self.graph.node_weight(n).map(|data| data.id))
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Link two nodes.
    ///
    /// Self-loops are rejected. Linking two nodes that are already linked is
    /// ignored: the existing edge id is returned and its weight is unchanged.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<EdgeId, LayoutError> {
        let a_index = *self
            .node_id_to_index
            .get(&a)
            .ok_or(LayoutError::UnknownNode(a))?;
        let b_index = *self
            .node_id_to_index
            .get(&b)
            .ok_or(LayoutError::UnknownNode(b))?;

        if a == b {
            return Err(LayoutError::SelfLoop { node: a });
        }

        if let Some(existing) = self.graph.find_edge(a_index, b_index) {
            let existing = self.graph[existing].id;
            warn!(source = a.0, target = b.0, edge = existing.0; "Ignoring duplicate edge");
            return Ok(existing);
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(a_index, b_index, EdgeData { id, weight });
        self.edge_id_to_index.insert(id, index);
        Ok(id)
    }

    /// Add edges from pairs [a0, b0, a1, b1, ...] with weight 1.0.
    ///
    /// Returns the number of pairs that produced a new edge.
    pub fn add_edges_from_pairs(&mut self, pairs: &[u32]) -> u32 {
        let before = self.edge_count();
        for pair in pairs.chunks_exact(2) {
            // Invalid pairs are skipped, like duplicates.
            if let Err(err) = self.add_edge(NodeId(pair[0]), NodeId(pair[1]), 1.0) {
                debug!(source = pair[0], target = pair[1], error = err.to_string(); "Skipping edge pair");
            }
        }
        (self.edge_count() - before) as u32
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if let Some(index) = self.edge_id_to_index.remove(&id) {
            self.graph.remove_edge(index);
            true
        } else {
            false
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edge-existence test between two nodes, in either orientation.
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edge_between(a, b).is_some()
    }

    /// The edge joining two nodes, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let a_index = self.node_id_to_index.get(&a)?;
        let b_index = self.node_id_to_index.get(&b)?;
        self.graph
            .find_edge(*a_index, *b_index)
            .map(|index| self.graph[index].id)
    }

    /// Get an edge's weight.
    pub fn edge_weight(&self, id: EdgeId) -> Option<f64> {
        let index = self.edge_id_to_index.get(&id)?;
        self.graph.edge_weight(*index).map(|data| data.weight)
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> Vec<EdgeView> {
        let mut edges: Vec<EdgeView> = self
            .graph
            .edge_references()
            .map(|e| {
                EdgeView::new(
                    e.weight().id,
                    self.graph[e.source()].id,
                    self.graph[e.target()].id,
                    e.weight().weight,
                )
            })
            .collect();
        edges.sort_unstable_by_key(|e| e.id);
        edges
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Clear all nodes and edges, resetting the graph to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
    }
}

impl Default for TrackGraph {
    fn default() -> Self {
        Self::new()
    }
}
