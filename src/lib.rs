//! Lineage Layout - WASM Module
//!
//! This module lays out cell-lineage tracking graphs as a "track scheme": a
//! grid where every track (connected component) gets its own lane of columns
//! and every time instant its own row. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Tracking graph using petgraph's StableGraph
//! - `layout`: Track discovery, row and column allocation, geometry, colors
//!   and branch containers
//! - `spatial`: R-tree index over laid-out cells for O(log n) hit testing
//! - `config`: Layout constants
//! - `error`: Error type shared by all of the above

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;

use config::LayoutConfig;
use error::LayoutError;
use graph::{EdgeId, NodeAttributes, NodeId, TrackGraph};
use layout::{Color, GradientColorMap, LayoutResult, TimeOrderedSplitter, TrackSchemeLayout};
use spatial::CellIndex;

/// Marks node slots with no cell in [`LineageLayoutWasm::cell_rects`].
pub const UNPLACED: f32 = f32::MAX;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(error: impl std::fmt::Display) -> JsError {
    JsError::new(&error.to_string())
}

/// Main entry point for the layout engine.
///
/// Owns the tracking graph, the layout engine and the results of the last
/// successful layout run.
#[wasm_bindgen]
pub struct LineageLayoutWasm {
    graph: TrackGraph,
    layout: TrackSchemeLayout,
    color_map: GradientColorMap,
    last: Option<LayoutResult>,
    cells: CellIndex,
}

#[wasm_bindgen]
impl LineageLayoutWasm {
    /// Create an empty graph with the default layout configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: TrackGraph::new(),
            layout: TrackSchemeLayout::default(),
            color_map: GradientColorMap::jet(),
            last: None,
            cells: CellIndex::new(),
        }
    }

    /// Create an engine with pre-allocated graph capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: TrackGraph::with_capacity(node_capacity, edge_capacity),
            ..Self::new()
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a detection.
    ///
    /// `timestamp` may be left out; the next layout run then fails with a
    /// missing attribute error until it is set.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, timestamp: Option<f64>, size: f64, label: String) -> u32 {
        let attributes = match timestamp {
            Some(t) => NodeAttributes::new(t, size, label),
            None => NodeAttributes::untimed(size, label),
        };
        self.graph.add_node(attributes).0
    }

    /// Remove a node and its links.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.graph.remove_node(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = setNodeTimestamp)]
    pub fn set_node_timestamp(&mut self, node_id: u32, timestamp: Option<f64>) -> Result<(), JsError> {
        self.graph
            .set_timestamp(NodeId(node_id), timestamp)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = setNodeSize)]
    pub fn set_node_size(&mut self, node_id: u32, size: f64) -> Result<(), JsError> {
        self.graph.set_size(NodeId(node_id), size).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setNodeLabel)]
    pub fn set_node_label(&mut self, node_id: u32, label: String) -> Result<(), JsError> {
        self.graph.set_label(NodeId(node_id), label).map_err(js_error)
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Get the upper bound on node slots (max slot + 1).
    /// May be larger than nodeCount if nodes have been removed.
    #[wasm_bindgen(js_name = nodeBound)]
    pub fn node_bound(&self) -> u32 {
        self.graph.node_bound() as u32
    }

    /// Get neighbors of a node, ascending.
    #[wasm_bindgen(js_name = getNeighbors)]
    pub fn get_neighbors(&self, node_id: u32) -> Vec<u32> {
        self.graph
            .neighbors(NodeId(node_id))
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Link two nodes.
    ///
    /// Returns the edge ID; linking an already linked pair returns the
    /// existing ID. Fails on unknown nodes and self-links.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32, weight: f64) -> Result<u32, JsError> {
        self.graph
            .add_edge(NodeId(source), NodeId(target), weight)
            .map(|id| id.0)
            .map_err(js_error)
    }

    /// Add edges from a Uint32Array of pairs.
    ///
    /// The edges array should be [a0, b0, a1, b1, ...].
    /// All edges get weight 1.0; invalid pairs are skipped.
    /// Returns the number of edges added.
    #[wasm_bindgen(js_name = addEdgesFromPairs)]
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        self.graph.add_edges_from_pairs(edges)
    }

    /// Remove an edge by ID.
    ///
    /// Returns true if the edge existed and was removed.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.graph.remove_edge(EdgeId(edge_id))
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Clear all nodes and edges, and forget the last layout.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.last = None;
        self.cells.clear();
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the layout configuration from a plain object.
    ///
    /// Missing keys keep their defaults; invalid values are rejected and the
    /// previous configuration stays in place.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: LayoutConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
        self.layout.set_config(config).map_err(js_error)
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.layout.config()).map_err(js_error)
    }

    /// Replace the track color map by a gradient through `0xRRGGBB` colors.
    #[wasm_bindgen(js_name = setColorStops)]
    pub fn set_color_stops(&mut self, colors: &[u32]) -> Result<(), JsError> {
        let colors: Vec<Color> = colors.iter().map(|&c| Color::from_u32(c)).collect();
        self.color_map = GradientColorMap::from_colors(&colors).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = isBranchGroupingEnabled)]
    pub fn is_branch_grouping_enabled(&self) -> bool {
        self.layout.is_branch_grouping_enabled()
    }

    /// Enable or disable branch containers; takes effect on the next run.
    #[wasm_bindgen(js_name = setBranchGrouping)]
    pub fn set_branch_grouping(&mut self, enable: bool) {
        self.layout.set_branch_grouping(enable);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute the layout of the current graph.
    ///
    /// Returns the full result as a plain object. On error the previous
    /// layout stays available through the accessors.
    pub fn execute(&mut self) -> Result<JsValue, JsError> {
        let result = self.run_layout().map_err(js_error)?;
        serde_wasm_bindgen::to_value(result).map_err(js_error)
    }

    /// Get the cell rectangles of the last layout.
    ///
    /// Returns [x0, y0, w0, h0, x1, ...] with one rectangle per node slot;
    /// slots without a cell hold `UNPLACED`.
    #[wasm_bindgen(js_name = getCellRects)]
    pub fn get_cell_rects(&self) -> Float32Array {
        Float32Array::from(&self.cell_rects()[..])
    }

    /// Column width of every track of the last layout.
    #[wasm_bindgen(js_name = getTrackColumnWidths)]
    pub fn get_track_column_widths(&self) -> Vec<u32> {
        self.layout.track_column_widths().to_vec()
    }

    /// Track colors of the last layout as `0xRRGGBB`.
    #[wasm_bindgen(js_name = getTrackColors)]
    pub fn get_track_colors(&self) -> Vec<u32> {
        self.layout
            .track_colors()
            .iter()
            .map(|color| color.to_u32())
            .collect()
    }

    /// Returns [instant0, row0, instant1, row1, ...], ascending.
    #[wasm_bindgen(js_name = getRowForInstant)]
    pub fn get_row_for_instant(&self) -> Vec<f64> {
        self.layout
            .row_for_instant()
            .iter()
            .flat_map(|&(instant, row)| [instant, f64::from(row)])
            .collect()
    }

    /// Branch containers of the last layout.
    #[wasm_bindgen(js_name = getContainers)]
    pub fn get_containers(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.layout.containers()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = containerCount)]
    pub fn container_count(&self) -> u32 {
        self.layout.containers().len() as u32
    }

    /// Fold or unfold every branch container; returns the updated containers.
    #[wasm_bindgen(js_name = setAllFolded)]
    pub fn set_all_folded(&mut self, folded: bool) -> Result<JsValue, JsError> {
        let containers = self.layout.set_all_folded(folded);
        serde_wasm_bindgen::to_value(containers).map_err(js_error)
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the cell under a point.
    ///
    /// Returns the node ID, or None if no cell contains the point.
    #[wasm_bindgen(js_name = findCellAt)]
    pub fn find_cell_at(&self, x: f64, y: f64) -> Option<u32> {
        self.cells.cell_at(x, y).map(|id| id.0)
    }

    /// Find the cell nearest to a point.
    #[wasm_bindgen(js_name = findNearestCell)]
    pub fn find_nearest_cell(&self, x: f64, y: f64) -> Option<u32> {
        self.cells.nearest(x, y).map(|id| id.0)
    }

    /// Find all cells intersecting a rectangular region.
    ///
    /// Returns a Uint32Array of node IDs, ascending.
    #[wasm_bindgen(js_name = findCellsInRect)]
    pub fn find_cells_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.cells
            .cells_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|id| id.0)
            .collect()
    }
}

impl LineageLayoutWasm {
    /// Run the layout with the current color map and rebuild the cell index.
    pub fn run_layout(&mut self) -> Result<&LayoutResult, LayoutError> {
        let result = self
            .layout
            .execute(&self.graph, &self.color_map, &TimeOrderedSplitter)?;
        self.cells.rebuild(&result.positions);
        Ok(self.last.insert(result))
    }

    /// The result of the last successful layout run.
    pub fn last_result(&self) -> Option<&LayoutResult> {
        self.last.as_ref()
    }

    pub fn graph(&self) -> &TrackGraph {
        &self.graph
    }

    /// Interleaved cell rectangles indexed by node slot.
    pub fn cell_rects(&self) -> Vec<f32> {
        let mut rects = vec![UNPLACED; self.graph.node_bound() * 4];
        let Some(result) = &self.last else {
            return rects;
        };
        for placement in &result.positions {
            let Some(slot) = self.graph.slot(placement.node) else {
                continue;
            };
            let rect = placement.rect;
            rects[slot * 4..slot * 4 + 4].copy_from_slice(&[
                rect.x as f32,
                rect.y as f32,
                rect.width as f32,
                rect.height as f32,
            ]);
        }
        rects
    }
}

impl Default for LineageLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}
