//! Graph data structures and operations.
//!
//! This module provides the tracking graph using petgraph's StableGraph
//! for stable node/edge indices. Nodes are detections at a time instant,
//! edges are undirected weighted temporal links.

mod edge;
mod engine;
mod node;

pub use edge::{EdgeId, EdgeView};
pub use engine::TrackGraph;
pub use node::{NodeAttributes, NodeId};
