//! Tests for the reduction and greedy zero-seeking assignment

#[cfg(test)]
mod tests {
    use mosaictile::algorithm::reduction::{
        padded_square, reduce_and_select, reduce_columns, reduce_rows,
    };
    use mosaictile::analysis::cost::CostMatrix;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    fn matrix(rows: &[Vec<f64>]) -> CostMatrix {
        CostMatrix::from_rows(rows).expect("valid cost matrix")
    }

    // Verifies a unique zero-cost diagonal matching is reproduced
    // Verified by picking the largest reduced value
    #[test]
    fn test_identity_matching() {
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = reduce_and_select(&matrix(&[vec![0.0, 5.0], vec![5.0, 0.0]]), &mut rng);

        assert_eq!(assignment.tiles(), &[0, 1]);
        assert!(assignment.fallback_cells().is_empty());
    }

    // Verifies a unique zero-cost anti-diagonal matching is reproduced
    // Verified by ignoring claimed columns
    #[test]
    fn test_swapped_matching() {
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = reduce_and_select(&matrix(&[vec![5.0, 0.0], vec![0.0, 5.0]]), &mut rng);

        assert_eq!(assignment.tiles(), &[1, 0]);
    }

    // Verifies reductions expose the matching even when no raw cost is zero
    // Verified by skipping the row reduction
    #[test]
    fn test_reduction_before_selection() {
        let mut rng = StdRng::seed_from_u64(1);
        let cost = matrix(&[
            vec![10.0, 19.0, 18.0],
            vec![21.0, 12.0, 30.0],
            vec![40.0, 45.0, 41.0],
        ]);
        let assignment = reduce_and_select(&cost, &mut rng);

        assert_eq!(assignment.tiles(), &[0, 1, 2]);
    }

    // Verifies the single greedy pass is kept: contending zeros go to the earlier row
    // Verified by replacing the pass with an exact solver
    #[test]
    fn test_greedy_pass_is_approximate() {
        let mut rng = StdRng::seed_from_u64(1);
        // Reduced: [[0, 0], [0, 10]]. Row 0 takes column 0 first, leaving row 1 the 10.
        let cost = matrix(&[vec![0.0, 0.0], vec![0.0, 10.0]]);
        let assignment = reduce_and_select(&cost, &mut rng);

        assert_eq!(assignment.tiles(), &[0, 1]);
        assert_eq!(cost.total_cost(assignment.tiles()), Some(10.0));
    }

    // Verifies ties go to the lowest tile index
    // Verified by using <= in the minimum search
    #[test]
    fn test_ties_pick_first_tile() {
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = reduce_and_select(&matrix(&[vec![3.0, 3.0, 3.0]]), &mut rng);

        assert_eq!(assignment.tiles(), &[0]);
    }

    // Verifies extra cells receive seeded random tiles and are recorded
    // Verified by leaving extra cells on tile 0
    #[test]
    fn test_fewer_tiles_than_cells() {
        let cost = matrix(&[
            vec![0.0, 9.0],
            vec![9.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
        ]);
        let first = reduce_and_select(&cost, &mut StdRng::seed_from_u64(99));
        let second = reduce_and_select(&cost, &mut StdRng::seed_from_u64(99));

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first.tiles().get(..2), Some(&[0, 1][..]));
        assert_eq!(first.fallback_cells(), &[2, 3]);
        assert!(first.tiles().iter().all(|&tile| tile < 2));
    }

    // Verifies extra tiles are simply left unused
    // Verified by claiming padded columns
    #[test]
    fn test_more_tiles_than_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let cost = matrix(&[vec![7.0, 1.0, 9.0, 4.0], vec![3.0, 8.0, 2.0, 6.0]]);
        let assignment = reduce_and_select(&cost, &mut rng);

        assert_eq!(assignment.tiles(), &[1, 2]);
        assert!(assignment.fallback_cells().is_empty());
    }

    // Verifies padding with zeros and both reduction passes
    // Verified by padding with the maximum cost
    #[test]
    fn test_padding_and_reductions() {
        let cost = matrix(&[vec![4.0, 6.0, 5.0], vec![7.0, 3.0, 9.0]]);
        let mut working = padded_square(&cost);
        assert_eq!(
            working,
            array![[4.0, 6.0, 5.0], [7.0, 3.0, 9.0], [0.0, 0.0, 0.0]]
        );

        reduce_rows(&mut working);
        assert_eq!(
            working,
            array![[0.0, 2.0, 1.0], [4.0, 0.0, 6.0], [0.0, 0.0, 0.0]]
        );

        let mut square = array![[5.0, 9.0], [7.0, 8.0]];
        reduce_columns(&mut square);
        assert_eq!(square, array![[0.0, 1.0], [2.0, 0.0]]);
    }
}
