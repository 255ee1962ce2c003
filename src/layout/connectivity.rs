//! Partition of the tracking graph into tracks (connected components).
//!
//! Components are merged with petgraph's union-find over node slots and then
//! numbered by their smallest node id, so the discovery order only depends on
//! stable identities.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use serde::Serialize;

use crate::graph::{EdgeId, NodeId, TrackGraph};

/// One connected component of the tracking graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Position in discovery order.
    pub index: usize,
    /// Member nodes, ascending.
    pub nodes: Vec<NodeId>,
    /// Induced edges, ascending.
    pub edges: Vec<EdgeId>,
}

impl Track {
    fn new(index: usize) -> Self {
        Self {
            index,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.binary_search(&id).is_ok()
    }
}

/// Find the tracks of `graph`, ordered by their smallest node id.
///
/// An empty graph yields no tracks; an isolated node is a track of its own.
pub fn find_tracks(graph: &TrackGraph) -> Vec<Track> {
    let edges = graph.edges();
    let mut sets = UnionFind::<usize>::new(graph.node_bound());

    for edge in &edges {
        if let (Some(a), Some(b)) = (graph.slot(edge.source), graph.slot(edge.target)) {
            sets.union(a, b);
        }
    }

    let mut track_of_root: HashMap<usize, usize> = HashMap::new();
    let mut tracks: Vec<Track> = Vec::new();

    for id in graph.node_ids() {
        let Some(slot) = graph.slot(id) else { continue };
        let root = sets.find(slot);
        let index = match track_of_root.get(&root) {
            Some(&index) => index,
            None => {
                let index = tracks.len();
                tracks.push(Track::new(index));
                track_of_root.insert(root, index);
                index
            }
        };
        tracks[index].nodes.push(id);
    }

    for edge in &edges {
        let Some(slot) = graph.slot(edge.source) else { continue };
        if let Some(&index) = track_of_root.get(&sets.find(slot)) {
            tracks[index].edges.push(edge.id);
        }
    }

    tracks
}

/// Map every node to the index of its track.
pub fn track_membership(tracks: &[Track]) -> HashMap<NodeId, usize> {
    tracks
        .iter()
        .flat_map(|track| track.nodes.iter().map(move |&id| (id, track.index)))
        .collect()
}
