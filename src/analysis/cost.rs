use crate::analysis::descriptor::{Descriptor, DescriptorKind};
use crate::io::configuration::PROGRESS_ROW_BATCH;
use crate::io::error::{Result, invalid_input};
use ndarray::{Array2, ArrayView1};

/// Dissimilarity between every grid cell (rows) and every tile (columns)
///
/// Entries are finite and non-negative. The matrix is never modified once built;
/// solvers copy it before reducing.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMatrix {
    costs: Array2<f64>,
}

impl CostMatrix {
    /// Build the matrix without progress reporting
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Self::build_with_progress`]
    pub fn build(cells: &[Descriptor], tiles: &[Descriptor]) -> Result<Self> {
        Self::build_with_progress(cells, tiles, |_| {})
    }

    /// Build the matrix, reporting the fraction of rows done every few rows
    ///
    /// Progress is reported after row `i` whenever `i` is a multiple of the row batch
    /// size, as `i / rows`. The reported value never reaches 1.0; whoever owns the
    /// whole pipeline reports completion once the solve has finished as well.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - either descriptor list is empty
    /// - descriptors of different kinds are mixed
    /// - a computed cost is not finite
    pub fn build_with_progress<F>(
        cells: &[Descriptor],
        tiles: &[Descriptor],
        mut on_progress: F,
    ) -> Result<Self>
    where
        F: FnMut(f64),
    {
        let kind = validate_descriptors(cells, tiles)?;
        let rows = cells.len();
        let mut costs = Array2::zeros((rows, tiles.len()));

        for (i, (cell, mut row)) in cells.iter().zip(costs.rows_mut()).enumerate() {
            for (tile, cost) in tiles.iter().zip(row.iter_mut()) {
                *cost = kind.distance(cell.values(), tile.values());
                if !cost.is_finite() {
                    return Err(invalid_input(&format!("cost of cell {i} is not finite")));
                }
            }
            if i % PROGRESS_ROW_BATCH == 0 {
                on_progress(i as f64 / rows as f64);
            }
        }

        Ok(Self { costs })
    }

    /// Build a matrix directly from cost rows
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows or columns, rows differ in length, or a
    /// cost is negative or not finite
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(invalid_input(&"cost matrix needs at least one cell and one tile"));
        }
        if rows.iter().any(|row| row.len() != cols) {
            return Err(invalid_input(&"cost matrix rows differ in length"));
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        if flat.iter().any(|cost| !cost.is_finite() || *cost < 0.0) {
            return Err(invalid_input(&"costs must be finite and non-negative"));
        }

        let costs = Array2::from_shape_vec((rows.len(), cols), flat)
            .map_err(|e| invalid_input(&e))?;
        Ok(Self { costs })
    }

    /// Number of cells
    pub fn rows(&self) -> usize {
        self.costs.nrows()
    }

    /// Number of tiles
    pub fn cols(&self) -> usize {
        self.costs.ncols()
    }

    /// Cost of placing `tile` in `cell`
    pub fn get(&self, cell: usize, tile: usize) -> Option<f64> {
        self.costs.get([cell, tile]).copied()
    }

    /// Costs of every tile for one cell
    pub fn row(&self, cell: usize) -> Option<ArrayView1<'_, f64>> {
        (cell < self.rows()).then(|| self.costs.row(cell))
    }

    /// Underlying dense array
    pub const fn as_array(&self) -> &Array2<f64> {
        &self.costs
    }

    /// Total cost of an assignment given as one tile index per cell
    ///
    /// Returns `None` if the assignment length or an index does not fit the matrix
    pub fn total_cost(&self, tiles: &[usize]) -> Option<f64> {
        if tiles.len() != self.rows() {
            return None;
        }
        tiles
            .iter()
            .enumerate()
            .map(|(cell, &tile)| self.get(cell, tile))
            .sum()
    }
}

/// Check that both lists are non-empty and share one descriptor kind
///
/// # Errors
///
/// Returns an error if a list is empty or kinds are mixed
pub fn validate_descriptors(cells: &[Descriptor], tiles: &[Descriptor]) -> Result<DescriptorKind> {
    if cells.is_empty() {
        return Err(invalid_input(&"cell descriptor list is empty"));
    }
    if tiles.is_empty() {
        return Err(invalid_input(&"tile descriptor list is empty"));
    }

    let kind = cells
        .first()
        .or_else(|| tiles.first())
        .map(Descriptor::kind)
        .unwrap_or_default();
    if let Some(other) = cells
        .iter()
        .chain(tiles.iter())
        .map(Descriptor::kind)
        .find(|&k| k != kind)
    {
        return Err(invalid_input(&format!(
            "descriptor kinds must not be mixed ({kind:?} and {other:?})"
        )));
    }

    Ok(kind)
}
