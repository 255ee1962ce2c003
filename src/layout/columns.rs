//! Greedy column allocation.
//!
//! Tracks are laid out left to right in discovery order. Within a track the
//! nodes are visited depth-first from the earliest node, so that a lineage's
//! descendants stay in contiguous columns. Two pieces of state are carried
//! across tracks:
//!
//! - `next_free`: per instant, the last column taken at that row;
//! - `cursor`: the column the traversal is currently filling, which never
//!   moves left.
//!
//! A node goes to `max(next_free[instant] + 1, cursor)`. When the traversal
//! jumps to a node not linked to the previous one, the cursor is bumped once to
//! leave a visual gap. When a track is done, every row is reserved up to the
//! cursor, so the next track starts strictly to the right of it.
//!
//! A track's column width is `end_cursor - start_cursor + 1`, where the start
//! cursor is the end cursor of the previous track, or column 0 for the first
//! track (so the first track's width covers the two reserved header columns).
//! The cursor does not move between tracks, so `sum(widths)` is the last end
//! cursor plus the number of tracks.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::HashSet;

use log::trace;
use serde::Serialize;

use super::connectivity::Track;
use super::instants::InstantRows;
use crate::error::LayoutError;
use crate::graph::{NodeId, TrackGraph};

/// First column a node may occupy; columns 0 and 1 hold headers and margins.
pub const FIRST_NODE_COLUMN: u32 = 2;

/// Grid cell given to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment {
    pub node: NodeId,
    pub column: u32,
    pub row: u32,
}

/// Columns of one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackColumns {
    pub track: usize,
    /// Assignments in traversal order.
    pub assignments: Vec<ColumnAssignment>,
    /// Cursor the width is measured from: the previous track's end cursor,
    /// or 0 for the first track.
    pub start_cursor: u32,
    /// The cursor when the track ended.
    pub end_cursor: u32,
    /// Column width of the track.
    pub width: u32,
}

/// Cross-track allocation state, threaded through successive [`allocate`] calls.
///
/// [`allocate`]: ColumnAllocator::allocate
#[derive(Debug, Clone)]
pub struct ColumnAllocator {
    next_free: Vec<i64>,
    cursor: i64,
    width_base: i64,
}

impl ColumnAllocator {
    /// Fresh state for a layout over `instant_count` distinct instants.
    pub fn new(instant_count: usize) -> Self {
        Self {
            next_free: vec![-1; instant_count],
            cursor: i64::from(FIRST_NODE_COLUMN),
            width_base: 0,
        }
    }

    /// Current column cursor.
    pub fn cursor(&self) -> u32 {
        self.cursor as u32
    }

    /// Assign columns to every node of `track`.
    pub fn allocate(
        &mut self,
        graph: &TrackGraph,
        rows: &InstantRows,
        track: &Track,
    ) -> Result<TrackColumns, LayoutError> {
        let positions = instant_positions(graph, rows, track)?;
        let start_cursor = self.width_base;

        let mut assignments = Vec::with_capacity(track.len());
        let mut previous: Option<NodeId> = None;

        for node in depth_first_order(graph, track, &positions) {
            let instant = positions[&node];

            if let Some(previous) = previous {
                if !graph.contains_edge(node, previous) {
                    self.cursor += 1;
                }
            }

            let free_column = self.next_free[instant] + 1;
            let target = free_column.max(self.cursor);
            self.cursor = target;
            self.next_free[instant] = target;

            let assignment = ColumnAssignment {
                node,
                column: target as u32,
                row: instant as u32 + 1,
            };
            trace!(
                node = node.0,
                column = assignment.column,
                row = assignment.row;
                "Assigned column"
            );
            assignments.push(assignment);
            previous = Some(node);
        }

        if assignments.is_empty() {
            return Ok(TrackColumns {
                track: track.index,
                assignments,
                start_cursor: start_cursor as u32,
                end_cursor: self.cursor as u32,
                width: 0,
            });
        }

        let reserved = self.cursor + 1;
        self.next_free.iter_mut().for_each(|column| *column = reserved);
        self.width_base = self.cursor;

        Ok(TrackColumns {
            track: track.index,
            assignments,
            start_cursor: start_cursor as u32,
            end_cursor: self.cursor as u32,
            width: (self.cursor - start_cursor + 1) as u32,
        })
    }
}

/// Zero-based instant position of every node of the track.
fn instant_positions(
    graph: &TrackGraph,
    rows: &InstantRows,
    track: &Track,
) -> Result<HashMap<NodeId, usize>, LayoutError> {
    track
        .nodes
        .iter()
        .map(|&node| {
            let timestamp = graph.timestamp(node).ok_or(LayoutError::MissingAttribute {
                node,
                attribute: "timestamp",
            })?;
            let position = rows
                .position(timestamp)
                .ok_or(LayoutError::InvalidTimestamp {
                    node,
                    value: timestamp,
                })?;
            Ok((node, position))
        })
        .collect()
}

/// Pre-order depth-first traversal of a track.
///
/// Starts at the earliest node (lowest id on ties) and explores neighbors by
/// ascending `(instant, id)`.
fn depth_first_order(
    graph: &TrackGraph,
    track: &Track,
    positions: &HashMap<NodeId, usize>,
) -> Vec<NodeId> {
    let key = |node: &NodeId| (positions[node], *node);

    let Some(start) = track.nodes.iter().copied().min_by_key(key) else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(track.len());
    let mut visited: HashSet<NodeId> = HashSet::with_capacity(track.len());
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);

        let mut next: Vec<NodeId> = graph
            .neighbors(node)
            .into_iter()
            .filter(|n| !visited.contains(n) && positions.contains_key(n))
            .collect();
        // Smallest key on top of the stack.
        next.sort_unstable_by_key(|n| Reverse(key(n)));
        stack.extend(next);
    }

    order
}
