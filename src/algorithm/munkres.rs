use crate::algorithm::solver::{Assignment, random_tile};
use crate::analysis::cost::CostMatrix;
use crate::io::error::{Result, invalid_input};
use bitvec::prelude::*;
use ndarray::ArrayView2;
use rand::Rng;

/// Exact minimum-cost one-to-one assignment
///
/// Works on the unpadded matrix. With fewer tiles than cells the optimal matching
/// covers as many cells as there are tiles and the remaining cells get random tiles.
///
/// # Errors
///
/// Returns an error if the costs are large enough for the potentials to overflow
pub fn optimal_assignment<R: Rng + ?Sized>(
    cost: &CostMatrix,
    rng: &mut R,
) -> Result<Assignment> {
    let costs = cost.as_array();
    let (rows, cols) = costs.dim();

    // Potentials never exceed the largest cost once per row and column
    let largest = costs.iter().copied().fold(0.0, f64::max);
    if !(largest * (rows + cols) as f64).is_finite() {
        return Err(invalid_input(&"costs are too large for the exact solver"));
    }

    let matched = if rows <= cols {
        minimum_matching(&costs.view())?
    } else {
        let mut by_cell = vec![None; rows];
        for (tile, cell) in minimum_matching(&costs.t())?.into_iter().enumerate() {
            if let Some(slot) = cell.and_then(|cell| by_cell.get_mut(cell)) {
                *slot = Some(tile);
            }
        }
        by_cell
    };

    let mut fallback_cells = Vec::new();
    let tiles = matched
        .into_iter()
        .enumerate()
        .map(|(cell, tile)| {
            tile.unwrap_or_else(|| {
                fallback_cells.push(cell);
                random_tile(rng, cols)
            })
        })
        .collect();

    Ok(Assignment::new(tiles, fallback_cells))
}

/// Minimum-cost matching of every row to a distinct column, for `rows <= cols`
///
/// Shortest augmenting paths with row and column potentials, one row at a time.
/// Index 0 of the column arrays is a virtual column holding the row being inserted,
/// so real rows and columns are stored 1-based. Fails instead of looping when a
/// step finds no finite slack.
// Every index is bounded by the 1-based layout: rows in 0..=n, columns in 0..=m
#[allow(clippy::indexing_slicing)]
fn minimum_matching(costs: &ArrayView2<'_, f64>) -> Result<Vec<Option<usize>>> {
    let (n, m) = costs.dim();
    if n == 0 || n > m {
        return Ok(vec![None; n]);
    }

    let mut row_potential = vec![0.0; n + 1];
    let mut col_potential = vec![0.0; m + 1];
    let mut col_owner = vec![0usize; m + 1];
    let mut came_from = vec![0usize; m + 1];

    for row in 1..=n {
        col_owner[0] = row;
        let mut current = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut visited = bitvec![0; m + 1];

        loop {
            visited.set(current, true);
            let owner = col_owner[current];
            let mut delta = f64::INFINITY;
            let mut next = 0;

            for col in 1..=m {
                if visited[col] {
                    continue;
                }
                let slack = costs[[owner - 1, col - 1]] - row_potential[owner] - col_potential[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    came_from[col] = current;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    next = col;
                }
            }

            if !delta.is_finite() {
                return Err(invalid_input(&format!("no finite augmenting step for row {row}")));
            }

            for col in 0..=m {
                if visited[col] {
                    row_potential[col_owner[col]] += delta;
                    col_potential[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            current = next;
            if col_owner[current] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the virtual column
        while current != 0 {
            let previous = came_from[current];
            col_owner[current] = col_owner[previous];
            current = previous;
        }
    }

    let mut matching = vec![None; n];
    for col in 1..=m {
        let owner = col_owner[col];
        if owner != 0 {
            matching[owner - 1] = Some(col - 1);
        }
    }
    Ok(matching)
}
