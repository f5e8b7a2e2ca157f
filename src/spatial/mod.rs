//! Spatial data structures for the target image grid
//!
//! Cells are addressed in row-major order (y outer, x inner), which is also
//! the order of cost matrix rows and assignment entries.

/// Grid geometry and cell rectangles
pub mod grid;

pub use grid::{CellRect, GridGeometry};
