//! Image region descriptors
//!
//! A descriptor is a short vector summarising one image region. Two kinds exist and
//! a single run must use one of them for every cell and tile:
//! - mean color: average red, green and blue over the region
//! - grayscale features: an 8×6 luminance grid with its own mean removed, so regions
//!   that differ only by a uniform brightness offset describe identically

use crate::io::configuration::{
    CHANNEL_MAX, FEATURE_GRID_COLUMNS, FEATURE_GRID_ROWS, FEATURE_LENGTH, MEAN_COLOR_LENGTH,
};
use crate::io::error::{Result, invalid_input};
use crate::math::distance::{center, manhattan, squared_euclidean};
use crate::spatial::CellRect;
use image::{GenericImageView, Rgb, RgbImage, imageops};
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Which summary is computed for each image region
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptorKind {
    /// Mean red, green and blue, compared by squared Euclidean distance
    #[default]
    MeanColor,
    /// Zero-mean 8×6 luminance grid, compared by L1 distance
    #[value(alias = "grayscale")]
    GrayscaleFeatures,
}

impl DescriptorKind {
    /// Number of elements in descriptors of this kind
    pub const fn descriptor_len(self) -> usize {
        match self {
            Self::MeanColor => MEAN_COLOR_LENGTH,
            Self::GrayscaleFeatures => FEATURE_LENGTH,
        }
    }

    /// Infer the kind from a raw vector length
    pub const fn from_len(len: usize) -> Option<Self> {
        match len {
            MEAN_COLOR_LENGTH => Some(Self::MeanColor),
            FEATURE_LENGTH => Some(Self::GrayscaleFeatures),
            _ => None,
        }
    }

    /// Values an element of this kind can take
    ///
    /// Channel means stay within `[0, 255]`; centered luminance within `[-255, 255]`.
    pub const fn value_range(self) -> RangeInclusive<f64> {
        match self {
            Self::MeanColor => 0.0..=CHANNEL_MAX,
            Self::GrayscaleFeatures => -CHANNEL_MAX..=CHANNEL_MAX,
        }
    }

    /// Dissimilarity between two descriptor vectors of this kind
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::MeanColor => squared_euclidean(a, b),
            Self::GrayscaleFeatures => manhattan(a, b),
        }
    }
}

/// Immutable fixed-length summary of one image region
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    kind: DescriptorKind,
    values: Box<[f64]>,
}

impl Descriptor {
    /// Wrap precomputed values as a descriptor of the given kind
    ///
    /// # Errors
    ///
    /// Returns an error if the length does not match the kind or a value lies outside
    /// [`DescriptorKind::value_range`]
    pub fn new(kind: DescriptorKind, values: Vec<f64>) -> Result<Self> {
        if values.len() != kind.descriptor_len() {
            return Err(invalid_input(&format!(
                "{kind:?} descriptor needs {} values, got {}",
                kind.descriptor_len(),
                values.len()
            )));
        }
        let range = kind.value_range();
        if let Some(value) = values.iter().find(|v| !range.contains(*v)) {
            return Err(invalid_input(&format!(
                "{kind:?} descriptor value {value} lies outside [{}, {}]",
                range.start(),
                range.end()
            )));
        }
        Ok(Self {
            kind,
            values: values.into_boxed_slice(),
        })
    }

    /// Wrap raw values, inferring the kind from their length
    ///
    /// # Errors
    ///
    /// Returns an error if no descriptor kind has this length or a value is out of range
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let kind = DescriptorKind::from_len(values.len()).ok_or_else(|| {
            invalid_input(&format!(
                "descriptor length {} matches neither {MEAN_COLOR_LENGTH} (mean color) nor {FEATURE_LENGTH} (grayscale features)",
                values.len()
            ))
        })?;
        Self::new(kind, values)
    }

    /// Mean color descriptor from red, green and blue averages
    ///
    /// # Errors
    ///
    /// Returns an error if a channel lies outside `[0, 255]`
    pub fn mean_color(rgb: [f64; 3]) -> Result<Self> {
        Self::new(DescriptorKind::MeanColor, rgb.to_vec())
    }

    /// Kind of this descriptor
    pub const fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Descriptor elements
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dissimilarity to another descriptor using this descriptor's metric
    pub fn distance(&self, other: &Self) -> f64 {
        self.kind.distance(&self.values, &other.values)
    }
}

/// Computes descriptors of one kind from RGB images
#[derive(Clone, Copy, Debug, Default)]
pub struct DescriptorExtractor {
    kind: DescriptorKind,
}

impl DescriptorExtractor {
    /// Create an extractor producing descriptors of the given kind
    pub const fn new(kind: DescriptorKind) -> Self {
        Self { kind }
    }

    /// Kind of descriptors produced
    pub const fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Describe an image after box-sampling it to `width` × `height`
    ///
    /// Tiles are sampled at the size of a grid cell before they are described, so a
    /// tile and a cell are summarised at the same resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the image or the requested size is empty
    pub fn extract<I>(&self, image: &I, width: u32, height: u32) -> Result<Descriptor>
    where
        I: GenericImageView<Pixel = Rgb<u8>>,
    {
        let (source_width, source_height) = image.dimensions();
        if source_width == 0 || source_height == 0 {
            return Err(invalid_input(&"cannot describe an empty image"));
        }
        if width == 0 || height == 0 {
            return Err(invalid_input(&format!(
                "cannot describe a region of {width}x{height} pixels"
            )));
        }

        let resized = box_sample(
            source_width as usize,
            source_height as usize,
            width as usize,
            height as usize,
            |x, y| image.get_pixel(x as u32, y as u32).0.map(f64::from),
        );

        match self.kind {
            DescriptorKind::MeanColor => Descriptor::mean_color(mean_channels(&resized)),
            DescriptorKind::GrayscaleFeatures => {
                Descriptor::new(self.kind, grayscale_features(&resized))
            }
        }
    }

    /// Describe one cell of a larger image at its own resolution
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle lies outside the image or is empty
    pub fn extract_region(&self, image: &RgbImage, rect: CellRect) -> Result<Descriptor> {
        let fits = |start: u32, len: u32, extent: u32| {
            start.checked_add(len).is_some_and(|end| end <= extent)
        };
        if !fits(rect.x, rect.width, image.width()) || !fits(rect.y, rect.height, image.height())
        {
            return Err(invalid_input(&format!(
                "cell {rect:?} lies outside the {}x{} image",
                image.width(),
                image.height()
            )));
        }
        let region = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height);
        self.extract(&*region, rect.width, rect.height)
    }
}

/// Average non-overlapping source spans into a `columns` × `rows` grid
///
/// Each output sample is the plain mean of the source pixels it covers, which keeps
/// the result linear in pixel values. When upsampling, spans shrink to one pixel.
fn box_sample(
    source_width: usize,
    source_height: usize,
    columns: usize,
    rows: usize,
    pixel: impl Fn(usize, usize) -> [f64; 3],
) -> Array3<f64> {
    let mut samples = Array3::zeros((rows, columns, 3));

    for row in 0..rows {
        let (y_start, y_end) = span(source_height, rows, row);
        for col in 0..columns {
            let (x_start, x_end) = span(source_width, columns, col);

            let mut totals = [0.0; 3];
            for y in y_start..y_end {
                for x in x_start..x_end {
                    for (total, value) in totals.iter_mut().zip(pixel(x, y)) {
                        *total += value;
                    }
                }
            }

            let count = ((y_end - y_start) * (x_end - x_start)) as f64;
            for (channel, total) in totals.iter().enumerate() {
                if let Some(sample) = samples.get_mut((row, col, channel)) {
                    *sample = total / count;
                }
            }
        }
    }

    samples
}

const fn span(extent: usize, parts: usize, index: usize) -> (usize, usize) {
    let start = index * extent / parts;
    let end = (index + 1) * extent / parts;
    if end > start {
        (start, end)
    } else {
        (start, start + 1)
    }
}

fn mean_channels(samples: &Array3<f64>) -> [f64; 3] {
    [0, 1, 2].map(|channel| samples.index_axis(Axis(2), channel).mean().unwrap_or(0.0))
}

fn grayscale_features(samples: &Array3<f64>) -> Vec<f64> {
    let (rows, columns, _) = samples.dim();
    let grid = box_sample(
        columns,
        rows,
        FEATURE_GRID_COLUMNS,
        FEATURE_GRID_ROWS,
        |x, y| [0, 1, 2].map(|channel| samples.get((y, x, channel)).copied().unwrap_or(0.0)),
    );

    let mut features: Vec<f64> = grid
        .lanes(Axis(2))
        .into_iter()
        .map(|rgb| rgb.mean().unwrap_or(0.0))
        .collect();
    center(&mut features);
    features
}
