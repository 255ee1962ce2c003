//! R-tree index of laid-out cells using the rstar crate.
//!
//! Provides O(log n) queries on cell rectangles for:
//! - Point picking (which cell is under the cursor)
//! - Nearest cell
//! - Rectangle intersection (rubber-band selection)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;
use crate::layout::{NodePlacement, Rect};

/// A cell rectangle in the index with its node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBox {
    /// The node identifier.
    pub id: NodeId,
    /// Absolute cell rectangle.
    pub rect: Rect,
}

impl CellBox {
    /// Create a new CellBox.
    pub fn new(id: NodeId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

impl RTreeObject for CellBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.max_x(), self.rect.max_y()],
        )
    }
}

impl PointDistance for CellBox {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.rect.x - point[0]).max(point[0] - self.rect.max_x()).max(0.0);
        let dy = (self.rect.y - point[1]).max(point[1] - self.rect.max_y()).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.rect.contains(point[0], point[1])
    }
}

/// Spatial index over the cells of one layout.
///
/// Uses an R*-tree; rebuilt wholesale after every layout run.
#[derive(Debug, Default)]
pub struct CellIndex {
    tree: RTree<CellBox>,
}

impl CellIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the cells of a layout.
    pub fn from_placements(placements: &[NodePlacement]) -> Self {
        let mut index = Self::new();
        index.rebuild(placements);
        index
    }

    /// Replace the indexed cells.
    ///
    /// This is more efficient than incremental inserts for bulk updates.
    pub fn rebuild(&mut self, placements: &[NodePlacement]) {
        let boxes: Vec<_> = placements
            .iter()
            .map(|p| CellBox::new(p.node, p.rect))
            .collect();
        self.tree = RTree::bulk_load(boxes);
    }

    /// The cell containing a point; the lowest node id wins on overlap.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|cell| cell.id)
            .min()
    }

    /// The cell closest to a point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|cell| cell.id)
    }

    /// Cells intersecting a rectangle, ascending node id.
    pub fn cells_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut ids: Vec<NodeId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|cell| cell.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Clear all cells from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of cells in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
