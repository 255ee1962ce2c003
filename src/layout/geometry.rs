//! Grid to layout-space geometry.
//!
//! A node at `(column, row)` is drawn as a cell of fixed width centred on the
//! column and vertically centred on the row. The cell height follows the
//! object's size, clamped to `[min_cell_height, cell_width]`.

use serde::Serialize;

use crate::config::LayoutConfig;

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from min and max corners.
    pub fn from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Inclusive point containment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.max_x() && y >= self.y && y <= self.max_y()
    }

    /// Bounding box of a set of rectangles, `None` when empty.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc: Option<Rect>, rect| {
            Some(acc.map_or(*rect, |acc| acc.union(rect)))
        })
    }
}

/// Cell height for an object of the given size.
pub fn cell_height(size: f64, config: &LayoutConfig) -> f64 {
    let height = (2.0 * size / config.calibration_factor).round();
    // NaN sizes fall back to the floor.
    if height.is_nan() {
        return config.min_cell_height;
    }
    height.min(config.cell_width).max(config.min_cell_height)
}

/// Absolute cell rectangle for a node.
pub fn cell_rect(column: u32, row: u32, size: f64, config: &LayoutConfig) -> Rect {
    let height = cell_height(size, config);
    let x = f64::from(column) * config.column_unit_width - config.cell_width / 2.0;
    let y = (0.5 + f64::from(row)) * config.row_unit_height - height / 2.0;
    Rect::new(x, y, config.cell_width, height)
}
