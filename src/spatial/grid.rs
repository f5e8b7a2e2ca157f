use crate::io::configuration::MAX_SCALE_FACTOR;
use crate::io::error::{Result, invalid_parameter};

/// Pixel rectangle covered by one grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels (always at least 1)
    pub width: u32,
    /// Height in pixels (always at least 1)
    pub height: u32,
}

/// Square grid of `scale_factor` × `scale_factor` cells laid over an image
///
/// Cell edges are placed at `i * extent / scale_factor`, so cells differ by at most
/// one pixel and together cover every pixel of the image exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    width: u32,
    height: u32,
    scale_factor: u32,
}

impl GridGeometry {
    /// Create a grid over an image of the given size
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `scale_factor` is zero or exceeds the configured maximum
    /// - the image is smaller than `scale_factor` pixels along either axis,
    ///   which would leave some cells empty
    pub fn new(width: u32, height: u32, scale_factor: u32) -> Result<Self> {
        if scale_factor == 0 || scale_factor > MAX_SCALE_FACTOR {
            return Err(invalid_parameter(
                "scale_factor",
                &scale_factor,
                &format!("must be between 1 and {MAX_SCALE_FACTOR}"),
            ));
        }
        if width < scale_factor || height < scale_factor {
            return Err(invalid_parameter(
                "scale_factor",
                &scale_factor,
                &format!("image of {width}x{height} pixels cannot hold that many cells per side"),
            ));
        }
        Ok(Self {
            width,
            height,
            scale_factor,
        })
    }

    /// Same grid over an image `factor` times larger in both dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is zero or the scaled size overflows
    pub fn scaled(&self, factor: u32) -> Result<Self> {
        let overflow = || invalid_parameter("upscale", &factor, &"scaled image size overflows");
        if factor == 0 {
            return Err(invalid_parameter("upscale", &factor, &"must be at least 1"));
        }
        let width = self.width.checked_mul(factor).ok_or_else(overflow)?;
        let height = self.height.checked_mul(factor).ok_or_else(overflow)?;
        Self::new(width, height, self.scale_factor)
    }

    /// Image width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cells per side
    pub const fn scale_factor(&self) -> u32 {
        self.scale_factor
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        (self.scale_factor as usize) * (self.scale_factor as usize)
    }

    /// Nominal cell size used when describing tiles
    pub const fn nominal_cell_size(&self) -> (u32, u32) {
        (self.width / self.scale_factor, self.height / self.scale_factor)
    }

    /// Rectangle of the cell at a row-major index
    pub fn cell_rect(&self, index: usize) -> Option<CellRect> {
        if index >= self.cell_count() {
            return None;
        }
        let scale = self.scale_factor as usize;
        let (row, col) = ((index / scale) as u32, (index % scale) as u32);

        let x = self.edge(self.width, col);
        let y = self.edge(self.height, row);
        Some(CellRect {
            x,
            y,
            width: self.edge(self.width, col + 1) - x,
            height: self.edge(self.height, row + 1) - y,
        })
    }

    /// All cell rectangles in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellRect> + '_ {
        (0..self.cell_count()).filter_map(|index| self.cell_rect(index))
    }

    // Widened to u64 so large images cannot overflow the product
    const fn edge(&self, extent: u32, step: u32) -> u32 {
        ((extent as u64 * step as u64) / self.scale_factor as u64) as u32
    }
}
