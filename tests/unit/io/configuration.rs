//! Tests for engine constants

#[cfg(test)]
mod tests {
    use mosaictile::analysis::descriptor::DescriptorKind;
    use mosaictile::io::configuration::{
        DEFAULT_BLEND, DEFAULT_SCALE_FACTOR, DEFAULT_UPSCALE, FEATURE_GRID_COLUMNS,
        FEATURE_GRID_ROWS, FEATURE_LENGTH, MAX_SCALE_FACTOR, MEAN_COLOR_LENGTH,
        PROGRESS_ROW_BATCH, TILE_EXTENSIONS,
    };

    // Verifies descriptor lengths agree with the descriptor kinds
    // Verified by changing the feature grid to 8 by 8
    #[test]
    fn test_descriptor_lengths() {
        assert_eq!(FEATURE_LENGTH, 48);
        assert_eq!(FEATURE_GRID_COLUMNS * FEATURE_GRID_ROWS, FEATURE_LENGTH);
        assert_eq!(DescriptorKind::GrayscaleFeatures.descriptor_len(), FEATURE_LENGTH);
        assert_eq!(DescriptorKind::MeanColor.descriptor_len(), MEAN_COLOR_LENGTH);
    }

    // Verifies defaults lie within their accepted ranges
    // Verified by setting the default blend above one
    #[test]
    fn test_defaults_in_range() {
        assert!((0.0..=1.0).contains(&DEFAULT_BLEND));
        assert!((1..=MAX_SCALE_FACTOR).contains(&DEFAULT_SCALE_FACTOR));
        assert!(DEFAULT_UPSCALE >= 1);
        assert_eq!(PROGRESS_ROW_BATCH, 5);
        assert!(TILE_EXTENSIONS.contains(&"png"));
    }
}
