use crate::algorithm::solver::{Assignment, first_minimum, random_tile};
use crate::analysis::cost::CostMatrix;
use rand::Rng;

/// Greedy nearest match with a per-tile usage cap
///
/// Cells are visited in row-major order and each takes its cheapest tile among those
/// used fewer than `max_uses_per_tile` times, first on ties. There is no lookahead, so
/// early cells get the best picks. Once every tile is saturated, cells take a random
/// tile, which still counts toward that tile's usage.
pub fn capped_nearest<R: Rng + ?Sized>(
    cost: &CostMatrix,
    max_uses_per_tile: usize,
    rng: &mut R,
) -> Assignment {
    let cols = cost.cols();
    let mut usage = vec![0usize; cols];
    let mut tiles = Vec::with_capacity(cost.rows());
    let mut fallback_cells = Vec::new();

    for (cell, costs) in cost.as_array().rows().into_iter().enumerate() {
        let best = first_minimum(
            costs
                .iter()
                .copied()
                .zip(usage.iter())
                .enumerate()
                .filter(|&(_, (_, &used))| used < max_uses_per_tile)
                .map(|(tile, (value, _))| (tile, value)),
        );

        let tile = best.unwrap_or_else(|| {
            fallback_cells.push(cell);
            random_tile(rng, cols)
        });
        if let Some(count) = usage.get_mut(tile) {
            *count = count.saturating_add(1);
        }
        tiles.push(tile);
    }

    Assignment::new(tiles, fallback_cells)
}
