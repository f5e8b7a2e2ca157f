//! Mathematical utilities for descriptor comparison
//!
//! This module contains the distance metrics used to fill the cost matrix
//! and the averaging helpers shared by descriptor extraction.

/// Distance metrics over descriptor vectors
pub mod distance;
