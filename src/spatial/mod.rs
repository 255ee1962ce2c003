//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over the cell
//! rectangles of a computed layout.

mod rtree;

pub use rtree::{CellBox, CellIndex};
