use crate::algorithm::solver::{Assignment, first_minimum, random_tile};
use crate::analysis::cost::CostMatrix;
use bitvec::prelude::*;
use ndarray::Array2;
use rand::Rng;

/// Approximate one-to-one assignment by reduction and a greedy zero-seeking pass
///
/// 1. Copy the costs into an `n × n` matrix, `n = max(cells, tiles)`, padding with 0.
/// 2. Subtract each row's minimum from the row.
/// 3. Subtract each column's minimum from the column.
/// 4. Walk cells in order, claiming the unclaimed tile with the smallest reduced cost
///    (lowest index on ties).
/// 5. Cells left without a tile get a random one.
///
/// Padding entries cost nothing, so on non-square inputs the reductions are biased
/// toward the padded side. Only real tiles are ever claimed in step 4.
pub fn reduce_and_select<R: Rng + ?Sized>(cost: &CostMatrix, rng: &mut R) -> Assignment {
    let (rows, cols) = (cost.rows(), cost.cols());
    let mut working = padded_square(cost);
    reduce_rows(&mut working);
    reduce_columns(&mut working);

    let mut claimed = bitvec![0; cols];
    let mut tiles = Vec::with_capacity(rows);
    let mut fallback_cells = Vec::new();

    for (cell, reduced) in working.rows().into_iter().take(rows).enumerate() {
        let best = first_minimum(
            reduced
                .iter()
                .take(cols)
                .copied()
                .enumerate()
                .filter(|&(tile, _)| claimed.get(tile).as_deref() == Some(&false)),
        );

        let tile = if let Some(tile) = best {
            claimed.set(tile, true);
            tile
        } else {
            fallback_cells.push(cell);
            random_tile(rng, cols)
        };
        tiles.push(tile);
    }

    Assignment::new(tiles, fallback_cells)
}

/// Square working copy of the costs with zero padding
pub fn padded_square(cost: &CostMatrix) -> Array2<f64> {
    let n = cost.rows().max(cost.cols());
    Array2::from_shape_fn((n, n), |(cell, tile)| cost.get(cell, tile).unwrap_or(0.0))
}

/// Subtract each row's minimum from every entry of that row
pub fn reduce_rows(matrix: &mut Array2<f64>) {
    for mut row in matrix.rows_mut() {
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            row.mapv_inplace(|value| value - min);
        }
    }
}

/// Subtract each column's minimum from every entry of that column
pub fn reduce_columns(matrix: &mut Array2<f64>) {
    for mut column in matrix.columns_mut() {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            column.mapv_inplace(|value| value - min);
        }
    }
}
