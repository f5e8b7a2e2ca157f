//! Engine constants and runtime configuration defaults

// Descriptor settings
/// Columns in the grayscale feature sample grid
pub const FEATURE_GRID_COLUMNS: usize = 8;
/// Rows in the grayscale feature sample grid
pub const FEATURE_GRID_ROWS: usize = 6;
/// Number of elements in a grayscale feature descriptor
pub const FEATURE_LENGTH: usize = FEATURE_GRID_COLUMNS * FEATURE_GRID_ROWS;
/// Number of elements in a mean color descriptor
pub const MEAN_COLOR_LENGTH: usize = 3;
/// Largest 8-bit channel value, bounding every descriptor element
pub const CHANNEL_MAX: f64 = 255.0;

// Progress is reported once per batch of cost matrix rows
/// Rows computed between progress notifications
pub const PROGRESS_ROW_BATCH: usize = 5;
/// Resolution of the terminal progress bar
pub const PROGRESS_BAR_STEPS: u64 = 1000;

// Default values for configurable parameters
/// Grid cells per side of the target image
pub const DEFAULT_SCALE_FACTOR: u32 = 10;
/// Opacity of the target image drawn over the tiles
pub const DEFAULT_BLEND: f32 = 0.3;
/// Fixed seed for reproducible fallback choices
pub const DEFAULT_SEED: u64 = 42;
/// Resolution multiplier for high resolution export
pub const DEFAULT_UPSCALE: u32 = 4;

// Safety limit to prevent excessive cost matrix allocation
/// Maximum allowed grid cells per side
pub const MAX_SCALE_FACTOR: u32 = 400;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_mosaic";
/// Suffix added to high resolution output filenames
pub const HD_OUTPUT_SUFFIX: &str = "_mosaic_hd";
/// File extensions accepted as tile images
pub const TILE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
