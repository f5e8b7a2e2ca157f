use crate::algorithm::{capped, munkres, reduction};
use crate::analysis::cost::CostMatrix;
use crate::io::error::{Result, invalid_input};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Whether a tile may fill more than one cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Each tile fills at most one cell, unless there are fewer tiles than cells
    #[default]
    NoDuplicates,
    /// Tiles may repeat up to a per-tile usage cap
    DuplicatesAllowed {
        /// Maximum number of cells a single tile may fill
        max_uses_per_tile: usize,
    },
}

impl DuplicatePolicy {
    /// Allow duplicates with the given cap
    pub const fn capped(max_uses_per_tile: usize) -> Self {
        Self::DuplicatesAllowed { max_uses_per_tile }
    }

    /// Allow any tile to be reused without limit
    pub const fn uncapped() -> Self {
        Self::capped(usize::MAX)
    }

    /// Whether tiles may repeat
    pub const fn allows_duplicates(self) -> bool {
        matches!(self, Self::DuplicatesAllowed { .. })
    }

    /// Reject policies that cannot produce an assignment
    ///
    /// # Errors
    ///
    /// Returns an error if duplicates are allowed with a cap of zero
    pub fn validate(self) -> Result<Self> {
        match self {
            Self::DuplicatesAllowed {
                max_uses_per_tile: 0,
            } => Err(invalid_input(&"max uses per tile must be positive")),
            _ => Ok(self),
        }
    }
}

/// Algorithm used when duplicates are not allowed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SolveStrategy {
    /// Row and column reduction followed by one greedy pass over reduced costs
    ///
    /// Fast and usually close to optimal, but contending zeros are resolved in row
    /// order instead of by augmenting paths.
    #[default]
    Reduction,
    /// Exact minimum-cost assignment (Kuhn–Munkres with dual potentials)
    ///
    /// Produces different output from [`Self::Reduction`] on tie-heavy inputs.
    Optimal,
}

/// Tile index chosen for each cell in row-major cell order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    tiles: Vec<usize>,
    fallback_cells: Vec<usize>,
}

impl Assignment {
    pub(crate) const fn new(tiles: Vec<usize>, fallback_cells: Vec<usize>) -> Self {
        Self {
            tiles,
            fallback_cells,
        }
    }

    /// Tile index per cell
    pub fn tiles(&self) -> &[usize] {
        &self.tiles
    }

    /// Tile placed in one cell
    pub fn tile_for(&self, cell: usize) -> Option<usize> {
        self.tiles.get(cell).copied()
    }

    /// Number of cells covered
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no cell is covered
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cells whose tile was drawn at random
    ///
    /// Non-empty when there were fewer tiles than cells without duplicates, or when
    /// every tile reached its usage cap.
    pub fn fallback_cells(&self) -> &[usize] {
        &self.fallback_cells
    }

    /// How many cells each tile fills
    pub fn usage_counts(&self, tile_count: usize) -> Vec<usize> {
        let mut counts = vec![0; tile_count];
        for &tile in &self.tiles {
            if let Some(count) = counts.get_mut(tile) {
                *count += 1;
            }
        }
        counts
    }

    /// Consume the assignment, returning the tile index per cell
    pub fn into_tiles(self) -> Vec<usize> {
        self.tiles
    }
}

/// Assign tiles to cells with the default strategy
///
/// # Errors
///
/// Returns an error if the policy is invalid or the matrix has no cells or tiles
pub fn solve<R: Rng + ?Sized>(
    cost: &CostMatrix,
    policy: DuplicatePolicy,
    rng: &mut R,
) -> Result<Assignment> {
    solve_with_strategy(cost, policy, SolveStrategy::default(), rng)
}

/// Assign tiles to cells
///
/// `rng` is only drawn from for cells that receive a random fallback tile. The
/// strategy applies to [`DuplicatePolicy::NoDuplicates`]; duplicates always use the
/// capped nearest-match pass.
///
/// # Errors
///
/// Returns an error if the policy is invalid, the matrix has no cells or tiles,
/// or the exact solver cannot handle the cost magnitudes
pub fn solve_with_strategy<R: Rng + ?Sized>(
    cost: &CostMatrix,
    policy: DuplicatePolicy,
    strategy: SolveStrategy,
    rng: &mut R,
) -> Result<Assignment> {
    if cost.rows() == 0 || cost.cols() == 0 {
        return Err(invalid_input(&"cost matrix needs at least one cell and one tile"));
    }

    let assignment = match policy.validate()? {
        DuplicatePolicy::NoDuplicates => match strategy {
            SolveStrategy::Reduction => reduction::reduce_and_select(cost, rng),
            SolveStrategy::Optimal => munkres::optimal_assignment(cost, rng)?,
        },
        DuplicatePolicy::DuplicatesAllowed { max_uses_per_tile } => {
            capped::capped_nearest(cost, max_uses_per_tile, rng)
        }
    };

    Ok(assignment)
}

/// Solver owning its random source
///
/// Seeded solvers make fallback choices reproducible across runs.
pub struct Solver<R = StdRng> {
    rng: R,
    strategy: SolveStrategy,
}

impl Solver<StdRng> {
    /// Create a solver with a seeded standard generator
    pub fn seeded(seed: u64, strategy: SolveStrategy) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), strategy)
    }
}

impl<R: Rng> Solver<R> {
    /// Create a solver drawing fallback choices from `rng`
    pub const fn with_rng(rng: R, strategy: SolveStrategy) -> Self {
        Self { rng, strategy }
    }

    /// Strategy used without duplicates
    pub const fn strategy(&self) -> SolveStrategy {
        self.strategy
    }

    /// Assign tiles to cells
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid or the matrix has no cells or tiles
    pub fn solve(&mut self, cost: &CostMatrix, policy: DuplicatePolicy) -> Result<Assignment> {
        solve_with_strategy(cost, policy, self.strategy, &mut self.rng)
    }
}

/// Index of the smallest value, keeping the first on ties
pub(crate) fn first_minimum(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    candidates
        .fold(None, |best: Option<(usize, f64)>, (index, value)| match best {
            Some((_, best_value)) if value >= best_value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

/// Uniformly random tile index for cells that could not be matched
pub(crate) fn random_tile<R: Rng + ?Sized>(rng: &mut R, tile_count: usize) -> usize {
    rng.random_range(0..tile_count.max(1))
}
