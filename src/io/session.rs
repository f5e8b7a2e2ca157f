//! Caller-owned state for building compute requests
//!
//! The engine keeps nothing between runs. Loaded images and run parameters live in a
//! [`Session`] held by the front end, which turns them into a fresh request each time.

use crate::algorithm::executor::ComputeRequest;
use crate::algorithm::solver::{DuplicatePolicy, SolveStrategy};
use crate::analysis::descriptor::{DescriptorExtractor, DescriptorKind};
use crate::io::configuration::DEFAULT_SCALE_FACTOR;
use crate::io::error::{Result, invalid_input};
use crate::spatial::GridGeometry;
use image::RgbImage;

/// Parameters fixed for the lifetime of one run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Grid cells per side of the target image
    pub scale_factor: u32,
    /// Whether and how often tiles may repeat
    pub policy: DuplicatePolicy,
    /// Descriptor computed for cells and tiles
    pub descriptor_kind: DescriptorKind,
    /// Algorithm used when tiles may not repeat
    pub strategy: SolveStrategy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            policy: DuplicatePolicy::default(),
            descriptor_kind: DescriptorKind::default(),
            strategy: SolveStrategy::default(),
        }
    }
}

/// Request ready for the worker together with the grid it was built on
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRun {
    /// Grid laid over the target image
    pub geometry: GridGeometry,
    /// Descriptors and policy for the worker
    pub request: ComputeRequest,
}

/// Currently loaded images and run parameters
#[derive(Clone, Debug, Default)]
pub struct Session {
    target: Option<RgbImage>,
    tiles: Vec<RgbImage>,
    config: RunConfig,
}

impl Session {
    /// Create an empty session with the given parameters
    pub fn new(config: RunConfig) -> Self {
        Self {
            target: None,
            tiles: Vec::new(),
            config,
        }
    }

    /// Replace the target image
    pub fn set_target(&mut self, target: RgbImage) {
        self.target = Some(target);
    }

    /// Replace the whole tile set
    pub fn set_tiles(&mut self, tiles: Vec<RgbImage>) {
        self.tiles = tiles;
    }

    /// Replace the run parameters used by later requests
    pub const fn set_config(&mut self, config: RunConfig) {
        self.config = config;
    }

    /// Loaded target image
    pub const fn target(&self) -> Option<&RgbImage> {
        self.target.as_ref()
    }

    /// Loaded tiles
    pub fn tiles(&self) -> &[RgbImage] {
        &self.tiles
    }

    /// Current run parameters
    pub const fn config(&self) -> RunConfig {
        self.config
    }

    /// Whether a target and at least one tile are loaded
    pub fn is_ready(&self) -> bool {
        self.target.is_some() && !self.tiles.is_empty()
    }

    /// Grid over the loaded target
    ///
    /// # Errors
    ///
    /// Returns an error if no target is loaded or the grid does not fit it
    pub fn geometry(&self) -> Result<GridGeometry> {
        let target = self.require_target()?;
        GridGeometry::new(target.width(), target.height(), self.config.scale_factor)
    }

    /// Describe every cell and tile and assemble a compute request
    ///
    /// Tiles are described at the nominal cell size, cells at their own size.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no target or no tiles are loaded
    /// - the grid does not fit the target
    /// - a tile image is empty
    pub fn build_request(&self) -> Result<PreparedRun> {
        let target = self.require_target()?;
        if self.tiles.is_empty() {
            return Err(invalid_input(&"no tiles loaded"));
        }

        let geometry = self.geometry()?;
        let extractor = DescriptorExtractor::new(self.config.descriptor_kind);
        let (cell_width, cell_height) = geometry.nominal_cell_size();

        let tile_descriptors = self
            .tiles
            .iter()
            .map(|tile| extractor.extract(tile, cell_width, cell_height))
            .collect::<Result<Vec<_>>>()?;
        let cell_descriptors = geometry
            .cells()
            .map(|rect| extractor.extract_region(target, rect))
            .collect::<Result<Vec<_>>>()?;

        let request = ComputeRequest::new(cell_descriptors, tile_descriptors, self.config.policy)
            .with_strategy(self.config.strategy);
        request.validate()?;

        Ok(PreparedRun { geometry, request })
    }

    fn require_target(&self) -> Result<&RgbImage> {
        self.target
            .as_ref()
            .ok_or_else(|| invalid_input(&"no target image loaded"))
    }
}
