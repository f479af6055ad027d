//! Core simulation types shared across the dotlife workspace.
//!
//! Owns the bounded cell grid and the generation update rule. Rendering
//! lives in `dotlife-render`, and the terminal driver loop in
//! `dotlife-app`; neither feeds back into the simulation.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use thiserror::Error;

/// Cell rows packed into a single display glyph by the renderer.
pub const BLOCK_ROWS: usize = 4;
/// Cell columns packed into a single display glyph by the renderer.
pub const BLOCK_COLS: usize = 2;

/// Monotonic generation counter owned by the driver loop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    /// Generation zero, the freshly seeded grid.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The following generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Errors surfaced while validating a [`LifeConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Static configuration for a life grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeConfig {
    /// Number of cell rows (must be a multiple of [`BLOCK_ROWS`]).
    pub rows: usize,
    /// Number of cell columns (must be a multiple of [`BLOCK_COLS`]).
    pub cols: usize,
    /// Probability that a cell starts alive when the grid is seeded.
    pub fill_probability: f32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            rows: 48,
            cols: 50,
            fill_probability: 0.1,
            rng_seed: None,
        }
    }
}

impl LifeConfig {
    /// Validates the configuration, returning the grid dimensions.
    fn dimensions(&self) -> Result<(usize, usize), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidConfig(
                "grid dimensions must be non-zero",
            ));
        }
        if !self.rows.is_multiple_of(BLOCK_ROWS) {
            return Err(ConfigError::InvalidConfig(
                "rows must be a multiple of the glyph block height",
            ));
        }
        if !self.cols.is_multiple_of(BLOCK_COLS) {
            return Err(ConfigError::InvalidConfig(
                "cols must be a multiple of the glyph block width",
            ));
        }
        if !(0.0..=1.0).contains(&self.fill_probability) {
            return Err(ConfigError::InvalidConfig(
                "fill_probability must lie within [0, 1]",
            ));
        }
        Ok((self.rows, self.cols))
    }

    /// Builds the RNG from the configured seed, drawing one from OS entropy
    /// if none was supplied.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Bounded 2D cell grid storing alive flags in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Construct a dead grid with `rows * cols` cells.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the flat index for `(row, col)`.
    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Returns whether the cell at `(row, col)` is alive.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[self.offset(row, col)]
    }

    /// Overwrites the cell at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        let idx = self.offset(row, col);
        self.cells[idx] = alive;
    }

    /// Kills every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Number of live cells in the grid.
    #[must_use]
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Whether every cell on the outer ring is dead.
    #[must_use]
    pub fn border_is_dead(&self) -> bool {
        (0..self.rows).all(|row| {
            (0..self.cols).all(|col| {
                let border = row == 0 || row + 1 == self.rows || col == 0 || col + 1 == self.cols;
                !border || !self.get(row, col)
            })
        })
    }

    /// Seeds every cell alive independently with the given probability.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, probability: f32) {
        for cell in &mut self.cells {
            *cell = rng.random::<f32>() < probability;
        }
    }

    /// Number of live Moore neighbors of an interior cell.
    fn live_neighbors(&self, row: usize, col: usize) -> usize {
        let mut count = 0;
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                if (r != row || c != col) && self.cells[r * self.cols + c] {
                    count += 1;
                }
            }
        }
        count
    }

    /// Computes the next generation from `self` into `next`, leaving `self`
    /// untouched.
    ///
    /// Cells on the outer ring are unconditionally dead in `next`; interior
    /// cells follow the two-state rule over their 8-cell Moore neighborhood,
    /// read exclusively from the old grid. `killed` counts interior deaths
    /// by under- or overpopulation (zeroed border cells are not counted),
    /// `born` counts dead-to-alive transitions, and `alive` is scanned from
    /// the freshly computed grid.
    pub fn step_into(&self, next: &mut Grid) -> RoundStats {
        if next.rows != self.rows || next.cols != self.cols {
            *next = Grid::new(self.rows, self.cols);
        }

        let mut killed = 0usize;
        let mut born = 0usize;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = row * self.cols + col;
                if row == 0 || row + 1 == self.rows || col == 0 || col + 1 == self.cols {
                    next.cells[idx] = false;
                    continue;
                }
                let neighbors = self.live_neighbors(row, col);
                next.cells[idx] = if self.cells[idx] {
                    if !(2..=3).contains(&neighbors) {
                        killed += 1;
                        false
                    } else {
                        true
                    }
                } else if neighbors == 3 {
                    born += 1;
                    true
                } else {
                    false
                };
            }
        }

        RoundStats {
            killed,
            born,
            alive: next.live_cells(),
        }
    }
}

/// Outcome of one evolution round, consumed by the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStats {
    /// Interior cells killed by under- or overpopulation this round.
    pub killed: usize,
    /// Dead interior cells that became alive this round.
    pub born: usize,
    /// Live cells in the grid after the round.
    pub alive: usize,
}

/// Aggregate simulation state: the live grid, its scratch buffer, and RNG.
pub struct Life {
    config: LifeConfig,
    grid: Grid,
    next: Grid,
    rng: SmallRng,
}

impl fmt::Debug for Life {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Life")
            .field("config", &self.config)
            .field("rows", &self.grid.rows())
            .field("cols", &self.grid.cols())
            .field("alive", &self.grid.live_cells())
            .finish()
    }
}

impl Life {
    /// Instantiate a life grid from the supplied configuration.
    pub fn new(config: LifeConfig) -> Result<Self, ConfigError> {
        let (rows, cols) = config.dimensions()?;
        let rng = config.seeded_rng();
        Ok(Self {
            grid: Grid::new(rows, cols),
            next: Grid::new(rows, cols),
            rng,
            config,
        })
    }

    /// Seeds the grid at the configured fill probability.
    ///
    /// The sole source of nondeterminism in the system; the driver calls it
    /// exactly once, at startup.
    pub fn randomize(&mut self) {
        let probability = self.config.fill_probability;
        self.grid.randomize(&mut self.rng, probability);
    }

    /// Advances the grid one generation, swapping in the fresh buffer.
    pub fn step(&mut self) -> RoundStats {
        let stats = self.grid.step_into(&mut self.next);
        mem::swap(&mut self.grid, &mut self.next);
        stats
    }

    /// Read-only view of the current generation's cells.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &LifeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(rows: usize, cols: usize, seed: u64) -> Life {
        let mut life = Life::new(LifeConfig {
            rows,
            cols,
            rng_seed: Some(seed),
            ..LifeConfig::default()
        })
        .expect("life");
        life.randomize();
        life
    }

    #[test]
    fn grid_accessors() {
        let mut grid = Grid::new(4, 6);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 6);
        assert!(!grid.get(1, 1));
        grid.set(2, 3, true);
        assert!(grid.get(2, 3));
        assert_eq!(grid.live_cells(), 1);
        grid.clear();
        assert_eq!(grid.live_cells(), 0);
    }

    #[test]
    fn config_validation_detects_errors() {
        let valid = LifeConfig::default();
        assert!(Life::new(valid.clone()).is_ok());

        let zero = LifeConfig {
            rows: 0,
            ..valid.clone()
        };
        assert_eq!(
            Life::new(zero).unwrap_err(),
            ConfigError::InvalidConfig("grid dimensions must be non-zero")
        );

        let ragged_rows = LifeConfig {
            rows: 50,
            ..valid.clone()
        };
        assert_eq!(
            Life::new(ragged_rows).unwrap_err(),
            ConfigError::InvalidConfig("rows must be a multiple of the glyph block height")
        );

        let ragged_cols = LifeConfig {
            cols: 51,
            ..valid.clone()
        };
        assert_eq!(
            Life::new(ragged_cols).unwrap_err(),
            ConfigError::InvalidConfig("cols must be a multiple of the glyph block width")
        );

        let overfull = LifeConfig {
            fill_probability: 1.5,
            ..valid
        };
        assert_eq!(
            Life::new(overfull).unwrap_err(),
            ConfigError::InvalidConfig("fill_probability must lie within [0, 1]")
        );
    }

    #[test]
    fn randomize_honours_probability_extremes() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut grid = Grid::new(8, 8);

        grid.randomize(&mut rng, 0.0);
        assert_eq!(grid.live_cells(), 0);

        grid.randomize(&mut rng, 1.0);
        assert_eq!(grid.live_cells(), 64);
    }

    #[test]
    fn border_ring_is_dead_after_every_step() {
        let mut life = seeded(8, 10, 0xD07);
        for _ in 0..12 {
            life.step();
            assert!(life.grid().border_is_dead());
        }
    }

    #[test]
    fn block_still_life_is_preserved() {
        let mut grid = Grid::new(6, 6);
        for (row, col) in [(2, 2), (2, 3), (3, 2), (3, 3)] {
            grid.set(row, col, true);
        }

        let mut next = Grid::new(6, 6);
        let stats = grid.step_into(&mut next);

        assert_eq!(next, grid);
        assert_eq!(
            stats,
            RoundStats {
                killed: 0,
                born: 0,
                alive: 4
            }
        );
    }

    #[test]
    fn isolated_cell_dies_and_stays_dead() {
        let mut grid = Grid::new(6, 6);
        grid.set(3, 3, true);

        let mut next = Grid::new(6, 6);
        let stats = grid.step_into(&mut next);
        assert!(!next.get(3, 3));
        assert_eq!(stats.killed, 1);
        assert_eq!(stats.alive, 0);

        let mut after = Grid::new(6, 6);
        let stats = next.step_into(&mut after);
        assert!(!after.get(3, 3));
        assert_eq!(
            stats,
            RoundStats {
                killed: 0,
                born: 0,
                alive: 0
            }
        );
    }

    // Clockwise ring of interior cells around (3, 3) in an 8x8 grid.
    const RING: [(usize, usize); 8] = [
        (2, 2),
        (2, 3),
        (2, 4),
        (3, 4),
        (4, 4),
        (4, 3),
        (4, 2),
        (3, 2),
    ];

    fn ring_grid(center_alive: bool, neighbors: usize) -> Grid {
        let mut grid = Grid::new(8, 8);
        grid.set(3, 3, center_alive);
        for &(row, col) in RING.iter().take(neighbors) {
            grid.set(row, col, true);
        }
        grid
    }

    #[test]
    fn dead_cell_is_born_only_with_exactly_three_neighbors() {
        for neighbors in 0..=8 {
            let grid = ring_grid(false, neighbors);
            let mut next = Grid::new(8, 8);
            grid.step_into(&mut next);
            assert_eq!(
                next.get(3, 3),
                neighbors == 3,
                "dead cell with {neighbors} neighbors"
            );
        }
    }

    #[test]
    fn live_cell_survives_only_within_the_two_three_band() {
        for neighbors in 0..=8 {
            let grid = ring_grid(true, neighbors);
            let mut next = Grid::new(8, 8);
            grid.step_into(&mut next);
            assert_eq!(
                next.get(3, 3),
                neighbors == 2 || neighbors == 3,
                "live cell with {neighbors} neighbors"
            );
        }
    }

    #[test]
    fn stats_reconcile_with_grid_transitions() {
        let mut life = seeded(12, 12, 0xBEEF);
        for _ in 0..6 {
            let before = life.grid().clone();
            let stats = life.step();
            let after = life.grid();

            let mut killed = 0;
            let mut born = 0;
            for row in 1..before.rows() - 1 {
                for col in 1..before.cols() - 1 {
                    match (before.get(row, col), after.get(row, col)) {
                        (true, false) => killed += 1,
                        (false, true) => born += 1,
                        _ => {}
                    }
                }
            }

            assert_eq!(stats.killed, killed);
            assert_eq!(stats.born, born);
            assert_eq!(stats.alive, after.live_cells());
        }
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let mut a = seeded(16, 16, 0xFACADE);
        let mut b = seeded(16, 16, 0xFACADE);
        assert_eq!(a.grid(), b.grid());

        for _ in 0..24 {
            assert_eq!(a.step(), b.step());
            assert_eq!(a.grid(), b.grid());
        }
    }

    #[test]
    fn stepping_a_cloned_grid_matches() {
        let life = seeded(12, 12, 42);
        let grid = life.grid().clone();

        let mut next_a = Grid::new(12, 12);
        let mut next_b = Grid::new(12, 12);
        let stats_a = grid.step_into(&mut next_a);
        let stats_b = grid.step_into(&mut next_b);

        assert_eq!(stats_a, stats_b);
        assert_eq!(next_a, next_b);
    }

    #[test]
    fn generation_counter_advances() {
        let mut generation = Generation::zero();
        assert_eq!(generation, Generation(0));
        generation = generation.next();
        generation = generation.next();
        assert_eq!(generation, Generation(2));
    }

    #[test]
    fn step_into_resizes_a_mismatched_scratch_buffer() {
        let grid = Grid::new(6, 6);
        let mut next = Grid::new(2, 2);
        let stats = grid.step_into(&mut next);
        assert_eq!(next.rows(), 6);
        assert_eq!(next.cols(), 6);
        assert_eq!(stats.alive, 0);
    }
}
