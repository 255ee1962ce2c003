//! Track scheme layout.
//!
//! This module turns a tracking graph into a grid of cells: one lane of
//! columns per track, one row per time instant. The result carries absolute
//! cell rectangles, per-track colors and optional branch containers that a
//! renderer can draw directly.

pub mod branches;
pub mod color;
pub mod columns;
pub mod connectivity;
pub mod geometry;
pub mod instants;
pub mod track_scheme;

pub use branches::{BranchContainer, BranchMember, BranchSplitter, TimeOrderedSplitter};
pub use color::{Color, ColorMap, GradientColorMap};
pub use columns::{ColumnAllocator, TrackColumns};
pub use connectivity::Track;
pub use geometry::Rect;
pub use instants::InstantRows;
pub use track_scheme::{EdgeStyle, LayoutResult, NodePlacement, TrackSchemeLayout};
