//! Branch grouping.
//!
//! A track can be cut into branches, each wrapped in a collapsible container
//! drawn around its cells. The cutting itself is delegated to a
//! [`BranchSplitter`]; whatever it returns must partition the track, which is
//! checked before any container is built.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::color::Color;
use super::connectivity::Track;
use super::geometry::Rect;
use crate::config::LayoutConfig;
use crate::error::{BranchViolation, LayoutError};
use crate::graph::{NodeId, TrackGraph};

/// Decomposes a track into an ordered list of branches.
pub trait BranchSplitter {
    fn split(&self, graph: &TrackGraph, track: &Track) -> Vec<Vec<NodeId>>;
}

impl<F> BranchSplitter for F
where
    F: Fn(&TrackGraph, &Track) -> Vec<Vec<NodeId>>,
{
    fn split(&self, graph: &TrackGraph, track: &Track) -> Vec<Vec<NodeId>> {
        self(graph, track)
    }
}

/// Splits a track into maximal non-branching paths along the time axis.
///
/// Links are oriented from the earlier to the later instant; links inside one
/// instant have no orientation. A node continues into its successor when it
/// has exactly one successor and that successor has exactly one predecessor.
/// Branches are the maximal continuation chains, ordered by their first node's
/// `(instant, id)`. The result is a partition for any input, loops included.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedSplitter;

impl BranchSplitter for TimeOrderedSplitter {
    fn split(&self, graph: &TrackGraph, track: &Track) -> Vec<Vec<NodeId>> {
        let time = |node: NodeId| graph.timestamp(node).unwrap_or(f64::NAN);

        let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut predecessor_count: HashMap<NodeId, usize> = HashMap::new();
        for &node in &track.nodes {
            let t = time(node);
            let later: Vec<NodeId> = graph
                .neighbors(node)
                .into_iter()
                .filter(|&n| time(n) > t)
                .collect();
            for &n in &later {
                *predecessor_count.entry(n).or_default() += 1;
            }
            successors.insert(node, later);
        }

        let mut next: HashMap<NodeId, NodeId> = HashMap::new();
        let mut continued: HashSet<NodeId> = HashSet::new();
        for &node in &track.nodes {
            if let [only] = successors[&node].as_slice() {
                if predecessor_count.get(only) == Some(&1) {
                    next.insert(node, *only);
                    continued.insert(*only);
                }
            }
        }

        let mut heads: Vec<NodeId> = track
            .nodes
            .iter()
            .copied()
            .filter(|node| !continued.contains(node))
            .collect();
        heads.sort_by(|a, b| time(*a).total_cmp(&time(*b)).then(a.cmp(b)));

        heads
            .into_iter()
            .map(|head| {
                let mut branch = vec![head];
                let mut current = head;
                while let Some(&following) = next.get(&current) {
                    branch.push(following);
                    current = following;
                }
                branch
            })
            .collect()
    }
}

/// Check that `branches` partition `track`; empty branches are dropped.
pub fn validate_partition(
    track: &Track,
    branches: Vec<Vec<NodeId>>,
) -> Result<Vec<Vec<NodeId>>, LayoutError> {
    let violation = |kind| LayoutError::InvariantViolation {
        track: track.index,
        kind,
    };

    let mut seen: HashSet<NodeId> = HashSet::with_capacity(track.len());
    for &node in branches.iter().flatten() {
        if !track.contains(node) {
            return Err(violation(BranchViolation::Foreign(node)));
        }
        if !seen.insert(node) {
            return Err(violation(BranchViolation::Overlap(node)));
        }
    }

    if let Some(&missing) = track.nodes.iter().find(|node| !seen.contains(node)) {
        return Err(violation(BranchViolation::Missing(missing)));
    }

    Ok(branches.into_iter().filter(|b| !b.is_empty()).collect())
}

/// A member cell of a branch container, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BranchMember {
    pub node: NodeId,
    pub rect: Rect,
}

/// Grouping box drawn around one branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchContainer {
    pub track: usize,
    pub branch: usize,
    pub label: String,
    /// Track color, used for the label.
    pub color: Color,
    /// Expanded bounds: the member cells plus a header band on top.
    pub bounds: Rect,
    /// Bounds when folded: the header band only.
    pub collapsed_bounds: Rect,
    pub members: Vec<BranchMember>,
    pub folded: bool,
}

impl BranchContainer {
    /// Build the container of one branch from the absolute cell rectangles.
    pub fn build(
        track: usize,
        branch: usize,
        color: Color,
        nodes: &[NodeId],
        cells: &HashMap<NodeId, Rect>,
        config: &LayoutConfig,
    ) -> Self {
        let content = Rect::bounding(nodes.iter().filter_map(|node| cells.get(node)))
            .unwrap_or_default();

        let top = content.y - config.header_size;
        let bounds = Rect::from_corners(content.x, top, content.max_x(), content.max_y());
        let collapsed_bounds = Rect::new(content.x, top, config.cell_width, config.header_size);

        let members = nodes
            .iter()
            .filter_map(|&node| {
                cells.get(&node).map(|rect| BranchMember {
                    node,
                    rect: rect.translate(-bounds.x, -bounds.y),
                })
            })
            .collect();

        Self {
            track,
            branch,
            label: format!("Track {} / Branch {}", track + 1, branch + 1),
            color,
            bounds,
            collapsed_bounds,
            members,
            folded: false,
        }
    }

    /// Bounds to draw given the current fold state.
    pub fn effective_bounds(&self) -> Rect {
        if self.folded {
            self.collapsed_bounds
        } else {
            self.bounds
        }
    }

    pub fn member_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().map(|m| m.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeAttributes;
    use crate::layout::connectivity::find_tracks;

    fn spot(graph: &mut TrackGraph, t: f64) -> NodeId {
        graph.add_node(NodeAttributes::new(t, 1.0, format!("t{t}")))
    }

    #[test]
    fn test_split_at_division() {
        // a -> b -> {c, d}; c -> e
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let c = spot(&mut graph, 2.0);
        let d = spot(&mut graph, 2.0);
        let e = spot(&mut graph, 3.0);
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(b, c, 1.0).unwrap();
        graph.add_edge(b, d, 1.0).unwrap();
        graph.add_edge(c, e, 1.0).unwrap();

        let track = &find_tracks(&graph)[0];
        let branches = TimeOrderedSplitter.split(&graph, track);
        assert_eq!(branches, vec![vec![a, b], vec![c, e], vec![d]]);
    }

    #[test]
    fn test_split_at_merge() {
        // {a, b} -> c -> d
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 0.0);
        let c = spot(&mut graph, 1.0);
        let d = spot(&mut graph, 2.0);
        graph.add_edge(a, c, 1.0).unwrap();
        graph.add_edge(b, c, 1.0).unwrap();
        graph.add_edge(c, d, 1.0).unwrap();

        let track = &find_tracks(&graph)[0];
        let branches = TimeOrderedSplitter.split(&graph, track);
        assert_eq!(branches, vec![vec![a], vec![b], vec![c, d]]);
    }

    #[test]
    fn test_split_loop_is_a_partition() {
        // a -> {b, c} -> d
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let c = spot(&mut graph, 1.0);
        let d = spot(&mut graph, 2.0);
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(a, c, 1.0).unwrap();
        graph.add_edge(b, d, 1.0).unwrap();
        graph.add_edge(c, d, 1.0).unwrap();

        let track = &find_tracks(&graph)[0];
        let branches = TimeOrderedSplitter.split(&graph, track);
        assert_eq!(branches, vec![vec![a], vec![b], vec![c], vec![d]]);
        assert!(validate_partition(track, branches).is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        graph.add_edge(a, b, 1.0).unwrap();
        let track = &find_tracks(&graph)[0];

        assert_eq!(
            validate_partition(track, vec![vec![a, b], vec![b]]),
            Err(LayoutError::InvariantViolation {
                track: 0,
                kind: BranchViolation::Overlap(b),
            })
        );
    }

    #[test]
    fn test_validate_rejects_missing_and_foreign() {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let stray = spot(&mut graph, 1.0);
        graph.add_edge(a, b, 1.0).unwrap();
        let track = &find_tracks(&graph)[0];

        assert_eq!(
            validate_partition(track, vec![vec![a]]),
            Err(LayoutError::InvariantViolation {
                track: 0,
                kind: BranchViolation::Missing(b),
            })
        );
        assert_eq!(
            validate_partition(track, vec![vec![a, b, stray]]),
            Err(LayoutError::InvariantViolation {
                track: 0,
                kind: BranchViolation::Foreign(stray),
            })
        );
    }

    #[test]
    fn test_validate_drops_empty_branches() {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let track = &find_tracks(&graph)[0];

        let branches = validate_partition(track, vec![vec![], vec![a], vec![]]).unwrap();
        assert_eq!(branches, vec![vec![a]]);
    }

    #[test]
    fn test_container_geometry() {
        let config = LayoutConfig::default();
        let a = NodeId(0);
        let b = NodeId(1);
        let cells = HashMap::from([
            (a, Rect::new(100.0, 200.0, 128.0, 40.0)),
            (b, Rect::new(100.0, 320.0, 128.0, 20.0)),
        ]);

        let container =
            BranchContainer::build(0, 1, Color::rgb(1, 2, 3), &[a, b], &cells, &config);

        assert_eq!(container.label, "Track 1 / Branch 2");
        assert_eq!(container.bounds, Rect::from_corners(100.0, 170.0, 228.0, 340.0));
        assert_eq!(container.collapsed_bounds, Rect::new(100.0, 170.0, 128.0, 30.0));
        assert_eq!(
            container.members,
            vec![
                BranchMember {
                    node: a,
                    rect: Rect::new(0.0, 30.0, 128.0, 40.0),
                },
                BranchMember {
                    node: b,
                    rect: Rect::new(0.0, 150.0, 128.0, 20.0),
                },
            ]
        );
        assert_eq!(container.effective_bounds(), container.bounds);
    }

    #[test]
    fn test_closure_splitter() {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        graph.add_edge(a, b, 1.0).unwrap();
        let track = &find_tracks(&graph)[0];

        let singletons = |_: &TrackGraph, track: &Track| -> Vec<Vec<NodeId>> {
            track.nodes.iter().map(|&n| vec![n]).collect()
        };
        assert_eq!(singletons.split(&graph, track), vec![vec![a], vec![b]]);
    }
}
