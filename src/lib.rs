//! Photomosaic tile assignment built on descriptor cost matrices
//!
//! Tiles and target grid cells are reduced to compact numeric descriptors, compared
//! through a dense cost matrix, and matched by an assignment solver that runs on a
//! background worker while reporting progress.

#![forbid(unsafe_code)]

/// Assignment solvers and the background execution channel
pub mod algorithm;
/// Image descriptors and cost matrix construction
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Distance metrics and small numeric helpers
pub mod math;
/// Grid geometry over the target image
pub mod spatial;

pub use io::error::{MosaicError, Result};
