//! Image loading, mosaic composition and PNG export

use crate::io::configuration::TILE_EXTENSIONS;
use crate::io::error::{MosaicError, Result, invalid_input, invalid_parameter};
use crate::spatial::GridGeometry;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load an image as 8-bit RGB, dropping any alpha channel
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(img.to_rgb8())
}

/// Paths of all tile images in a directory, sorted
///
/// # Errors
///
/// Returns an error if the directory cannot be read
pub fn collect_tile_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |e| MosaicError::FileSystem {
        path: dir.to_path_buf(),
        operation: "read tile directory",
        source: e,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_tile = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                TILE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
        if is_tile && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every tile image in a directory, sorted by path
///
/// # Errors
///
/// Returns an error if the directory cannot be read, holds no tile images, or a tile
/// cannot be decoded
pub fn load_tiles(dir: &Path) -> Result<Vec<RgbImage>> {
    let paths = collect_tile_paths(dir)?;
    if paths.is_empty() {
        return Err(invalid_input(&format!(
            "no tile images found in '{}'",
            dir.display()
        )));
    }
    paths.iter().map(|path| load_rgb(path)).collect()
}

/// Compose the mosaic described by an assignment
///
/// Each assigned tile is resized to its cell, then the target is drawn over the result
/// with opacity `blend`. The output has the size of `geometry`; the target is resized
/// to match when the grid has been scaled up for high resolution export.
///
/// # Errors
///
/// Returns an error if:
/// - `blend` lies outside `[0, 1]`
/// - the assignment does not have one entry per cell
/// - an entry is not a valid tile index
pub fn render_mosaic(
    target: &RgbImage,
    tiles: &[RgbImage],
    geometry: &GridGeometry,
    assignment: &[usize],
    blend: f32,
) -> Result<RgbImage> {
    if !(0.0..=1.0).contains(&blend) {
        return Err(invalid_parameter("blend", &blend, &"must be between 0 and 1"));
    }
    if assignment.len() != geometry.cell_count() {
        return Err(invalid_input(&format!(
            "assignment covers {} cells but the grid has {}",
            assignment.len(),
            geometry.cell_count()
        )));
    }

    let mut mosaic = RgbImage::new(geometry.width(), geometry.height());
    // Neighbouring cells differ by at most a pixel, so resized tiles repeat often
    let mut resized: HashMap<(usize, u32, u32), RgbImage> = HashMap::new();

    for (rect, &tile_index) in geometry.cells().zip(assignment) {
        let tile = tiles.get(tile_index).ok_or(MosaicError::InvalidTileIndex {
            index: tile_index,
            tile_count: tiles.len(),
        })?;
        let scaled = resized
            .entry((tile_index, rect.width, rect.height))
            .or_insert_with(|| {
                imageops::resize(tile, rect.width, rect.height, FilterType::Triangle)
            });
        imageops::replace(&mut mosaic, &*scaled, i64::from(rect.x), i64::from(rect.y));
    }

    if blend > 0.0 {
        let overlay = if target.dimensions() == mosaic.dimensions() {
            target.clone()
        } else {
            imageops::resize(target, mosaic.width(), mosaic.height(), FilterType::Triangle)
        };
        for (pixel, over) in mosaic.pixels_mut().zip(overlay.pixels()) {
            *pixel = blend_pixel(*pixel, *over, blend);
        }
    }

    Ok(mosaic)
}

fn blend_pixel(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| {
        f32::from(o)
            .mul_add(alpha, f32::from(b) * (1.0 - alpha))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let [r, g, b] = base.0;
    let [over_r, over_g, over_b] = over.0;
    Rgb([mix(r, over_r), mix(g, over_g), mix(b, over_b)])
}

/// Save an image as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file cannot be
/// written
pub fn save_png(img: &RgbImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| MosaicError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
