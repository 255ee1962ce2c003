//! Track scheme layout engine.
//!
//! Arranges a tracking graph in lanes, one lane per track, with one row per
//! instant. The passes run in order:
//!
//! 1. **Tracks:** connected components, numbered by smallest node id.
//! 2. **Rows:** distinct instants, ascending, from row 1.
//! 3. **Columns:** greedy depth-first column packing, shared across tracks.
//! 4. **Geometry and colors:** cell rectangles, one color per track.
//! 5. **Branch containers** (optional): one collapsible box per branch.
//!
//! Everything is recomputed on every call. The only state kept between calls
//! is the container set of the last successful run, which the next run
//! replaces wholesale, and the accessor data of that run.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use super::branches::{BranchContainer, BranchSplitter, TimeOrderedSplitter, validate_partition};
use super::color::{Color, ColorMap, GradientColorMap, track_colors};
use super::columns::{ColumnAllocator, TrackColumns};
use super::connectivity::{find_tracks, track_membership};
use super::geometry::{Rect, cell_rect};
use super::instants::InstantRows;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::{EdgeId, NodeId, TrackGraph};

/// Where and how one node is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePlacement {
    pub node: NodeId,
    pub track: usize,
    pub column: u32,
    pub row: u32,
    /// Absolute cell rectangle.
    pub rect: Rect,
    pub label: String,
    /// Stroke color: the track color.
    pub color: Color,
}

/// Label and color of one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub edge: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Weight with one decimal.
    pub label: String,
    pub color: Color,
}

/// Everything a renderer needs to draw one layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// One placement per node, ascending node id.
    pub positions: Vec<NodePlacement>,
    pub track_colors: Vec<Color>,
    pub track_column_widths: Vec<u32>,
    /// `(instant, row)`, ascending.
    pub row_for_instant: Vec<(f64, u32)>,
    /// Empty unless branch grouping is enabled.
    pub branch_containers: Vec<BranchContainer>,
    /// One style per edge, ascending edge id.
    pub edge_styles: Vec<EdgeStyle>,
}

impl LayoutResult {
    pub fn track_count(&self) -> usize {
        self.track_colors.len()
    }

    pub fn placement(&self, node: NodeId) -> Option<&NodePlacement> {
        self.positions
            .binary_search_by_key(&node, |p| p.node)
            .ok()
            .map(|i| &self.positions[i])
    }
}

/// The layout engine.
///
/// Owns the container set of its last run; callers get copies and must not
/// expect their own edits to survive the next [`execute`](Self::execute).
#[derive(Debug, Clone, Default)]
pub struct TrackSchemeLayout {
    config: LayoutConfig,
    branch_grouping: bool,
    containers: Vec<BranchContainer>,
    track_column_widths: Vec<u32>,
    row_for_instant: Vec<(f64, u32)>,
    track_colors: Vec<Color>,
}

impl TrackSchemeLayout {
    /// Create a layout engine with the given configuration.
    ///
    /// The configuration is validated when the layout runs.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the configuration; rejected configurations leave the old one.
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<(), LayoutError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn is_branch_grouping_enabled(&self) -> bool {
        self.branch_grouping
    }

    /// Takes effect on the next run; disabling clears the containers then.
    pub fn set_branch_grouping(&mut self, enable: bool) {
        self.branch_grouping = enable;
    }

    /// Containers of the last successful run.
    pub fn containers(&self) -> &[BranchContainer] {
        &self.containers
    }

    /// Fold or unfold every current container.
    pub fn set_all_folded(&mut self, folded: bool) -> &[BranchContainer] {
        for container in &mut self.containers {
            container.folded = folded;
        }
        &self.containers
    }

    /// Column widths of the tracks of the last successful run.
    pub fn track_column_widths(&self) -> &[u32] {
        &self.track_column_widths
    }

    /// `(instant, row)` pairs of the last successful run.
    pub fn row_for_instant(&self) -> &[(f64, u32)] {
        &self.row_for_instant
    }

    /// Track colors of the last successful run.
    pub fn track_colors(&self) -> &[Color] {
        &self.track_colors
    }

    /// Run the layout with the jet color map and [`TimeOrderedSplitter`].
    pub fn execute_default(&mut self, graph: &TrackGraph) -> Result<LayoutResult, LayoutError> {
        self.execute(graph, &GradientColorMap::jet(), &TimeOrderedSplitter)
    }

    /// Compute a fresh layout of `graph`.
    ///
    /// On error nothing is returned and the engine's state is unchanged.
    pub fn execute(
        &mut self,
        graph: &TrackGraph,
        color_map: &dyn ColorMap,
        splitter: &dyn BranchSplitter,
    ) -> Result<LayoutResult, LayoutError> {
        self.config.validate()?;

        let tracks = find_tracks(graph);
        let rows = InstantRows::collect(graph)?;
        let colors = track_colors(tracks.len(), color_map);

        let mut allocator = ColumnAllocator::new(rows.len());
        let mut lanes: Vec<TrackColumns> = Vec::with_capacity(tracks.len());
        for track in &tracks {
            let lane = allocator.allocate(graph, &rows, track)?;
            debug!(
                track = track.index,
                nodes = track.len(),
                start_cursor = lane.start_cursor,
                end_cursor = lane.end_cursor,
                width = lane.width;
                "Track laid out"
            );
            lanes.push(lane);
        }

        let mut positions = Vec::with_capacity(graph.node_count());
        for lane in &lanes {
            let color = colors[lane.track];
            for assignment in &lane.assignments {
                let attributes = graph
                    .attributes(assignment.node)
                    .ok_or(LayoutError::UnknownNode(assignment.node))?;
                positions.push(NodePlacement {
                    node: assignment.node,
                    track: lane.track,
                    column: assignment.column,
                    row: assignment.row,
                    rect: cell_rect(assignment.column, assignment.row, attributes.size, &self.config),
                    label: attributes.label.clone(),
                    color,
                });
            }
        }
        positions.sort_unstable_by_key(|p| p.node);

        let membership = track_membership(&tracks);
        let edge_styles = graph
            .edges()
            .into_iter()
            .filter_map(|edge| {
                let track = *membership.get(&edge.source)?;
                Some(EdgeStyle {
                    edge: edge.id,
                    source: edge.source,
                    target: edge.target,
                    label: format!("{:.1}", edge.weight),
                    color: colors[track],
                })
            })
            .collect();

        let mut containers = Vec::new();
        if self.branch_grouping {
            let cells: HashMap<NodeId, Rect> = positions.iter().map(|p| (p.node, p.rect)).collect();
            for track in &tracks {
                let branches = validate_partition(track, splitter.split(graph, track))?;
                for (branch, nodes) in branches.iter().enumerate() {
                    containers.push(BranchContainer::build(
                        track.index,
                        branch,
                        colors[track.index],
                        nodes,
                        &cells,
                        &self.config,
                    ));
                }
            }
        }

        let result = LayoutResult {
            positions,
            track_colors: colors,
            track_column_widths: lanes.iter().map(|lane| lane.width).collect(),
            row_for_instant: rows.iter().collect(),
            branch_containers: containers,
            edge_styles,
        };

        let retired = std::mem::replace(&mut self.containers, result.branch_containers.clone());
        self.track_column_widths = result.track_column_widths.clone();
        self.row_for_instant = result.row_for_instant.clone();
        self.track_colors = result.track_colors.clone();

        info!(
            tracks = result.track_count(),
            nodes = result.positions.len(),
            rows = rows.len(),
            columns = allocator.cursor() + 1,
            containers = self.containers.len(),
            retired_containers = retired.len();
            "Layout computed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BranchViolation;
    use crate::graph::NodeAttributes;
    use crate::layout::connectivity::Track;

    fn spot(graph: &mut TrackGraph, t: f64) -> NodeId {
        graph.add_node(NodeAttributes::new(t, 5.0, format!("t{t}")))
    }

    /// Red channel = sample position * 255, so samples can be read back.
    fn probe(t: f64) -> Color {
        Color::rgb((t * 255.0).round() as u8, 0, 0)
    }

    fn branch_point() -> (TrackGraph, [NodeId; 3]) {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let c = spot(&mut graph, 1.0);
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(a, c, 2.75).unwrap();
        (graph, [a, b, c])
    }

    #[test]
    fn test_branch_point_scenario() {
        let (graph, [a, b, c]) = branch_point();
        let mut layout = TrackSchemeLayout::default();

        let result = layout.execute(&graph, &probe, &TimeOrderedSplitter).unwrap();

        assert_eq!(result.track_count(), 1);
        assert_eq!(result.track_colors, vec![probe(0.0)]);
        assert_eq!(result.row_for_instant, vec![(0.0, 1), (1.0, 2)]);

        let pa = result.placement(a).unwrap();
        let pb = result.placement(b).unwrap();
        let pc = result.placement(c).unwrap();
        assert_eq!((pa.column, pa.row), (2, 1));
        assert_eq!(pb.row, 2);
        assert_eq!(pc.row, 2);
        assert_ne!(pb.column, pc.column);
        assert_eq!(pa.color, probe(0.0));
        assert_eq!(pa.label, "t0");

        assert_eq!(layout.track_column_widths(), &[4]);
        assert_eq!(layout.row_for_instant(), result.row_for_instant.as_slice());
        assert_eq!(layout.track_colors(), result.track_colors.as_slice());
    }

    #[test]
    fn test_two_disconnected_pairs() {
        let mut graph = TrackGraph::new();
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let c = spot(&mut graph, 2.0);
        let d = spot(&mut graph, 3.0);
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(c, d, 1.0).unwrap();

        let mut layout = TrackSchemeLayout::default();
        let result = layout.execute(&graph, &probe, &TimeOrderedSplitter).unwrap();

        assert_eq!(result.track_count(), 2);
        assert_eq!(result.track_colors, vec![probe(0.0), probe(1.0)]);
        assert_ne!(result.track_colors[0], result.track_colors[1]);

        let first_max = [a, b].iter().map(|&n| result.placement(n).unwrap().column).max();
        let second_min = [c, d].iter().map(|&n| result.placement(n).unwrap().column).min();
        assert!(first_max < second_min);

        // Track 0 ends at column 2 and is measured from 0; track 1 ends at
        // column 4 and is measured from track 0's end.
        assert_eq!(result.track_column_widths, vec![3, 3]);
        assert_eq!(layout.track_column_widths(), &[3, 3]);
    }

    #[test]
    fn test_three_track_widths() {
        let mut graph = TrackGraph::new();
        // Track 0 divides into two columns, tracks 1 and 2 are single nodes.
        let a = spot(&mut graph, 0.0);
        let b = spot(&mut graph, 1.0);
        let c = spot(&mut graph, 1.0);
        let d = spot(&mut graph, 0.0);
        let e = spot(&mut graph, 1.0);
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(a, c, 1.0).unwrap();

        let mut layout = TrackSchemeLayout::default();
        let result = layout.execute_default(&graph).unwrap();

        let column = |n: NodeId| result.placement(n).unwrap().column;
        assert_eq!((column(a), column(b), column(c)), (2, 2, 3));
        assert_eq!(column(d), 5);
        assert_eq!(column(e), 7);
        assert_eq!(result.track_column_widths, vec![4, 3, 3]);
    }

    #[test]
    fn test_edge_styles() {
        let (graph, [a, _, c]) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        let result = layout.execute(&graph, &probe, &TimeOrderedSplitter).unwrap();

        assert_eq!(result.edge_styles.len(), 2);
        let style = &result.edge_styles[1];
        assert_eq!((style.source, style.target), (a, c));
        assert_eq!(style.label, "2.8");
        assert_eq!(style.color, probe(0.0));
    }

    #[test]
    fn test_empty_graph() {
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);
        let result = layout.execute_default(&TrackGraph::new()).unwrap();
        assert_eq!(result, LayoutResult::default());
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let (graph, _) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);

        let first = layout.execute_default(&graph).unwrap();
        let count = layout.containers().len();
        let second = layout.execute_default(&graph).unwrap();

        assert_eq!(first, second);
        assert_eq!(count, 3);
        assert_eq!(layout.containers().len(), count);
        assert_eq!(layout.containers(), second.branch_containers.as_slice());
    }

    #[test]
    fn test_disabling_grouping_clears_containers() {
        let (graph, _) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);
        layout.execute_default(&graph).unwrap();
        assert!(!layout.containers().is_empty());

        layout.set_branch_grouping(false);
        assert!(!layout.is_branch_grouping_enabled());
        let result = layout.execute_default(&graph).unwrap();
        assert!(result.branch_containers.is_empty());
        assert!(layout.containers().is_empty());
    }

    #[test]
    fn test_containers_cover_their_members() {
        let (graph, _) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);
        let result = layout.execute_default(&graph).unwrap();

        for container in &result.branch_containers {
            for member in &container.members {
                let absolute = member.rect.translate(container.bounds.x, container.bounds.y);
                assert_eq!(absolute, result.placement(member.node).unwrap().rect);
                assert!(absolute.y >= container.bounds.y + layout.config().header_size);
            }
        }
    }

    #[test]
    fn test_fold_all() {
        let (graph, _) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);
        layout.execute_default(&graph).unwrap();

        let folded = layout.set_all_folded(true);
        assert!(folded.iter().all(|c| c.folded));
        assert!(
            folded
                .iter()
                .all(|c| c.effective_bounds() == c.collapsed_bounds)
        );
        assert!(layout.set_all_folded(false).iter().all(|c| !c.folded));
    }

    #[test]
    fn test_missing_timestamp_fails_without_side_effects() {
        let (mut graph, [a, _, _]) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);
        layout.execute_default(&graph).unwrap();
        let before = layout.containers().to_vec();

        graph.set_timestamp(a, None).unwrap();
        assert_eq!(
            layout.execute_default(&graph),
            Err(LayoutError::MissingAttribute {
                node: a,
                attribute: "timestamp",
            })
        );
        assert_eq!(layout.containers(), before.as_slice());
    }

    #[test]
    fn test_bad_splitter_is_an_invariant_violation() {
        let (graph, [a, _, _]) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        layout.set_branch_grouping(true);

        let duplicating = |_: &TrackGraph, track: &Track| -> Vec<Vec<NodeId>> {
            vec![track.nodes.clone(), vec![track.nodes[0]]]
        };
        assert_eq!(
            layout.execute(&graph, &probe, &duplicating),
            Err(LayoutError::InvariantViolation {
                track: 0,
                kind: BranchViolation::Overlap(a),
            })
        );
        assert!(layout.containers().is_empty());
    }

    #[test]
    fn test_splitter_ignored_without_grouping() {
        let (graph, _) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        let broken = |_: &TrackGraph, _: &Track| -> Vec<Vec<NodeId>> { Vec::new() };
        assert!(layout.execute(&graph, &probe, &broken).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut layout = TrackSchemeLayout::default();
        let bad = LayoutConfig {
            cell_width: -1.0,
            ..LayoutConfig::default()
        };
        assert!(layout.set_config(bad.clone()).is_err());
        assert_eq!(layout.config(), &LayoutConfig::default());

        let mut layout = TrackSchemeLayout::new(bad);
        assert!(matches!(
            layout.execute_default(&TrackGraph::new()),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_relayout_after_mutation() {
        let (mut graph, [a, b, c]) = branch_point();
        let mut layout = TrackSchemeLayout::default();
        let before = layout.execute_default(&graph).unwrap();
        assert_eq!(before.track_count(), 1);

        let edge = graph.edge_between(a, c).unwrap();
        graph.remove_edge(edge);
        let after = layout.execute_default(&graph).unwrap();
        assert_eq!(after.track_count(), 2);
        assert_eq!(after.placement(a).unwrap().track, after.placement(b).unwrap().track);
        assert_eq!(after.placement(c).unwrap().track, 1);
        assert_eq!(layout.track_column_widths().len(), 2);
    }
}
