//! Tests for cost matrix construction, validation and progress reporting

#[cfg(test)]
mod tests {
    use mosaictile::analysis::cost::{CostMatrix, validate_descriptors};
    use mosaictile::analysis::descriptor::{Descriptor, DescriptorKind};

    fn colors(values: &[[f64; 3]]) -> Vec<Descriptor> {
        values
            .iter()
            .map(|&rgb| Descriptor::mean_color(rgb).expect("finite color"))
            .collect()
    }

    // Verifies mean color costs are squared Euclidean distances
    // Verified by using absolute differences
    #[test]
    fn test_mean_color_costs() {
        let cells = colors(&[[10.0, 20.0, 30.0], [0.0, 0.0, 0.0]]);
        let tiles = colors(&[[10.0, 20.0, 30.0], [1.0, 1.0, 1.0]]);
        let cost = CostMatrix::build(&cells, &tiles).expect("cost matrix");

        assert_eq!((cost.rows(), cost.cols()), (2, 2));
        assert_eq!(cost.get(0, 0), Some(0.0));
        assert_eq!(cost.get(1, 1), Some(3.0));
        assert_eq!(cost.get(1, 0), Some(100.0 + 400.0 + 900.0));
        assert_eq!(cost.get(2, 0), None);
    }

    // Verifies grayscale feature costs use L1 distance
    // Verified by squaring the differences
    #[test]
    fn test_grayscale_costs_are_l1() {
        let mut shifted = vec![0.0; 48];
        if let Some(first) = shifted.first_mut() {
            *first = 3.0;
        }
        if let Some(last) = shifted.last_mut() {
            *last = -3.0;
        }
        let cells = vec![Descriptor::new(DescriptorKind::GrayscaleFeatures, vec![0.0; 48])
            .expect("features")];
        let tiles = vec![Descriptor::new(DescriptorKind::GrayscaleFeatures, shifted)
            .expect("features")];
        let cost = CostMatrix::build(&cells, &tiles).expect("cost matrix");

        assert_eq!(cost.get(0, 0), Some(6.0));
    }

    // Verifies progress arrives every fifth row, below 1.0 and non-decreasing
    // Verified by reporting after every row
    #[test]
    fn test_progress_batches() {
        let cells = colors(&[[0.0, 0.0, 0.0]; 12]);
        let tiles = colors(&[[1.0, 2.0, 3.0]; 2]);
        let mut reported = Vec::new();
        CostMatrix::build_with_progress(&cells, &tiles, |fraction| reported.push(fraction))
            .expect("cost matrix");

        assert_eq!(reported, vec![0.0, 5.0 / 12.0, 10.0 / 12.0]);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert!(reported.iter().all(|&f| f < 1.0));
    }

    // Verifies empty and mixed inputs are rejected
    // Verified by skipping the kind check
    #[test]
    fn test_invalid_descriptor_lists() {
        let colors_only = colors(&[[1.0, 2.0, 3.0]]);
        let features =
            vec![Descriptor::new(DescriptorKind::GrayscaleFeatures, vec![0.0; 48]).expect("features")];

        assert!(CostMatrix::build(&[], &colors_only).is_err_and(|e| e.is_invalid_input()));
        assert!(CostMatrix::build(&colors_only, &[]).is_err_and(|e| e.is_invalid_input()));
        assert!(CostMatrix::build(&colors_only, &features).is_err());
        assert_eq!(
            validate_descriptors(&features, &features).expect("same kind"),
            DescriptorKind::GrayscaleFeatures
        );
    }

    // Verifies raw rows are validated
    // Verified by accepting ragged rows
    #[test]
    fn test_from_rows_validation() {
        assert!(CostMatrix::from_rows(&[]).is_err());
        assert!(CostMatrix::from_rows(&[vec![]]).is_err());
        assert!(CostMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(CostMatrix::from_rows(&[vec![-1.0]]).is_err());
        assert!(CostMatrix::from_rows(&[vec![f64::INFINITY]]).is_err());

        let cost = CostMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .expect("cost matrix");
        assert_eq!((cost.rows(), cost.cols()), (2, 3));
        assert_eq!(cost.get(1, 2), Some(6.0));
        assert_eq!(cost.row(0).map(|row| row.to_vec()), Some(vec![1.0, 2.0, 3.0]));
        assert!(cost.row(2).is_none());
    }

    // Verified by summing the diagonal regardless of the assignment
    #[test]
    fn test_total_cost() {
        let cost = CostMatrix::from_rows(&[vec![1.0, 2.0], vec![4.0, 8.0]]).expect("cost matrix");

        assert_eq!(cost.total_cost(&[1, 0]), Some(6.0));
        assert_eq!(cost.total_cost(&[0, 1]), Some(9.0));
        assert_eq!(cost.total_cost(&[0]), None);
        assert_eq!(cost.total_cost(&[0, 5]), None);
    }
}
