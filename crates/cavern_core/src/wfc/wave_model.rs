//! The WFC solver: minimum-entropy selection, weighted collapse and
//! breadth-first constraint propagation over a grid of pattern cells.
//!
//! A `WaveModel` borrows a finished `PatternCatalog`, owns its wave and its
//! random source, and performs a single run. There is no backtracking: the
//! first empty domain ends the run with `WfcError::Contradiction`, and
//! retrying with another seed is up to the caller.

use super::direction::Direction;
use super::pattern_catalog::PatternCatalog;
use super::wave::Wave;
use crate::rng::{entropy_seed, DotNetRandom, WfcRng};
use crate::tile_grid::GridError;
use bitvec::prelude::*;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

/// Tie-breaking noise added to cell entropies during selection.
const ENTROPY_NOISE: f64 = 1e-6;

/// Errors ending a WFC run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WfcError {
    /// The catalog has no patterns to place.
    #[error("pattern catalog is empty")]
    EmptyCatalog,
    /// A cell ran out of possible patterns.
    #[error("contradiction at cell ({x}, {y})")]
    Contradiction { x: usize, y: usize },
    /// The run stopped with cells left uncollapsed.
    #[error("run finished before every cell collapsed")]
    IncompleteCollapse,
}

/// State of a WFC run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WfcState {
    /// Cells left to collapse
    Running,
    /// Every cell holds exactly one pattern
    Completed,
    /// A contradiction was reached
    Failed,
}

/// Solved grid of pattern indices, `index = x + y * width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGrid {
    width: usize,
    height: usize,
    cells: Vec<usize>,
}

impl PatternGrid {
    pub fn from_cells(width: usize, height: usize, cells: Vec<usize>) -> Result<Self, GridError> {
        let expected = width * height;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pattern index at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    pub fn get(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height);
        self.cells[x + y * self.width]
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }
}

/// Single-use WFC solver over an `width` x `height` grid of pattern cells.
pub struct WaveModel<'a> {
    catalog: &'a PatternCatalog,
    width: usize,
    height: usize,

    wave: Wave,

    /// Normalized pattern weights
    weights: Vec<f64>,

    /// Weight * ln(weight) for entropy updates
    weight_log_weights: Vec<f64>,

    rng: Box<dyn WfcRng>,

    /// Propagation work queue of cell indices
    queue: VecDeque<usize>,

    /// `queued[cell]` = cell is currently in `queue`
    queued: BitVec,

    /// Cells changed by the last collapse, seeding the next sweep
    changed: Vec<usize>,

    /// The first sweep visits every cell
    first_sweep: bool,

    state: WfcState,
    failure: Option<WfcError>,
    observations: usize,
}

impl<'a> WaveModel<'a> {
    /// Create a model using the .NET-compatible random source.
    ///
    /// With `seed = None` the run is not reproducible. Dimensions are
    /// clamped to at least 1.
    pub fn new(
        catalog: &'a PatternCatalog,
        width: usize,
        height: usize,
        seed: Option<i32>,
    ) -> Result<Self, WfcError> {
        let seed = seed.unwrap_or_else(entropy_seed);
        Self::with_rng(
            catalog,
            width,
            height,
            Box::new(DotNetRandom::from_seed(seed)),
        )
    }

    /// Create a model drawing from the given random source.
    pub fn with_rng(
        catalog: &'a PatternCatalog,
        width: usize,
        height: usize,
        rng: Box<dyn WfcRng>,
    ) -> Result<Self, WfcError> {
        let weights = catalog
            .weights_normalized()
            .map_err(|_| WfcError::EmptyCatalog)?;
        let weight_log_weights: Vec<f64> = weights
            .iter()
            .map(|&w| if w > 0.0 { w * w.ln() } else { 0.0 })
            .collect();

        let width = width.max(1);
        let height = height.max(1);
        let length = width * height;

        Ok(Self {
            catalog,
            width,
            height,
            wave: Wave::new(length, &weights, &weight_log_weights),
            weights,
            weight_log_weights,
            rng,
            queue: VecDeque::with_capacity(length),
            queued: bitvec![0; length],
            changed: Vec::new(),
            first_sweep: true,
            state: WfcState::Running,
            failure: None,
            observations: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn state(&self) -> WfcState {
        self.state
    }

    /// Number of collapse steps performed so far.
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Number of patterns still possible at (x, y).
    pub fn remaining(&self, x: usize, y: usize) -> usize {
        self.wave.remaining(self.cell(x, y))
    }

    /// Patterns still possible at (x, y), ascending.
    pub fn possible_patterns(&self, x: usize, y: usize) -> Vec<usize> {
        self.wave.possible_patterns(self.cell(x, y))
    }

    /// Weighted Shannon entropy at (x, y).
    pub fn entropy(&self, x: usize, y: usize) -> f64 {
        self.wave.entropy(self.cell(x, y))
    }

    /// The solved grid, once every cell has collapsed.
    pub fn pattern_grid(&self) -> Option<PatternGrid> {
        let cells = (0..self.wave.len())
            .map(|cell| self.wave.collapsed_pattern(cell))
            .collect::<Option<Vec<usize>>>()?;
        Some(PatternGrid {
            width: self.width,
            height: self.height,
            cells,
        })
    }

    /// Run to completion.
    ///
    /// Returns the fully collapsed pattern grid, or the contradiction that
    /// ended the run. Consumes the model: one run per instance.
    pub fn run(mut self) -> Result<PatternGrid, WfcError> {
        loop {
            match self.step()? {
                WfcState::Running => continue,
                WfcState::Completed => {
                    return self.pattern_grid().ok_or(WfcError::IncompleteCollapse);
                }
                WfcState::Failed => {
                    return Err(self.failure.unwrap_or(WfcError::IncompleteCollapse));
                }
            }
        }
    }

    /// Perform one select / collapse / propagate cycle.
    ///
    /// The first call also sweeps the whole grid once so patterns lacking
    /// support in the untouched wave are removed before anything collapses.
    pub fn step(&mut self) -> Result<WfcState, WfcError> {
        match self.state {
            WfcState::Completed => return Ok(WfcState::Completed),
            WfcState::Failed => {
                return Err(self.failure.unwrap_or(WfcError::IncompleteCollapse));
            }
            WfcState::Running => {}
        }

        if self.first_sweep {
            if let Err(cell) = self.propagate() {
                return Err(self.fail(cell));
            }
        }

        match self.next_unobserved_cell() {
            Err(cell) => Err(self.fail(cell)),
            Ok(None) => {
                self.state = WfcState::Completed;
                Ok(WfcState::Completed)
            }
            Ok(Some(cell)) => {
                self.observe(cell);
                if let Err(cell) = self.propagate() {
                    return Err(self.fail(cell));
                }
                if self.wave.is_collapsed() {
                    self.state = WfcState::Completed;
                }
                Ok(self.state)
            }
        }
    }

    #[inline]
    fn cell(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height);
        x + y * self.width
    }

    fn fail(&mut self, cell: usize) -> WfcError {
        let err = WfcError::Contradiction {
            x: cell % self.width,
            y: cell / self.width,
        };
        debug!(
            x = cell % self.width,
            y = cell / self.width,
            observations = self.observations,
            "wfc contradiction"
        );
        self.queue.clear();
        self.state = WfcState::Failed;
        self.failure = Some(err);
        err
    }

    /// Find the uncollapsed cell with minimum entropy.
    ///
    /// Returns `Ok(None)` if every cell is collapsed and `Err(cell)` for a
    /// cell with an empty domain.
    fn next_unobserved_cell(&mut self) -> Result<Option<usize>, usize> {
        let mut min_entropy = f64::MAX;
        let mut argmin = None;

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = x + y * self.width;
                match self.wave.remaining(cell) {
                    0 => return Err(cell),
                    1 => continue,
                    _ => {}
                }

                let key = self.wave.entropy(cell) + ENTROPY_NOISE * self.rng.next_double();
                if key < min_entropy {
                    min_entropy = key;
                    argmin = Some(cell);
                }
            }
        }

        Ok(argmin)
    }

    /// Collapse a cell to one pattern sampled by weight.
    fn observe(&mut self, cell: usize) {
        let survivors = self.wave.possible_patterns(cell);
        let total: f64 = survivors.iter().map(|&p| self.weights[p]).sum();

        let threshold = self.rng.next_double() * total;
        let mut partial_sum = 0.0;
        // Rounding can leave the threshold past the last partial sum
        let mut picked = survivors[survivors.len() - 1];
        for &p in &survivors {
            partial_sum += self.weights[p];
            if threshold <= partial_sum {
                picked = p;
                break;
            }
        }

        for &p in &survivors {
            if p != picked {
                self.wave
                    .ban(cell, p, self.weights[p], self.weight_log_weights[p]);
            }
        }

        self.observations += 1;
        self.changed.push(cell);
    }

    fn enqueue(&mut self, cell: usize) {
        if !self.queued[cell] {
            self.queued.set(cell, true);
            self.queue.push_back(cell);
        }
    }

    /// Breadth-first arc-consistency sweep.
    ///
    /// Removes from each neighbour every pattern with no compatible
    /// counterpart left in the source cell, re-enqueueing neighbours that
    /// changed. Returns `Err(cell)` for the first cell left empty.
    fn propagate(&mut self) -> Result<(), usize> {
        if self.first_sweep {
            self.first_sweep = false;
            for cell in 0..self.wave.len() {
                self.enqueue(cell);
            }
        }
        let changed = std::mem::take(&mut self.changed);
        for cell in changed {
            self.enqueue(cell);
        }

        while let Some(cell) = self.queue.pop_front() {
            self.queued.set(cell, false);
            let (x, y) = (cell % self.width, cell / self.width);

            for dir in Direction::ALL {
                let Some((nx, ny)) = dir.neighbor(x, y, self.width, self.height) else {
                    continue;
                };
                let neighbor = nx + ny * self.width;
                let back = dir.opposite();

                let mut changed = false;
                for q in self.wave.possible_patterns(neighbor) {
                    let supported = self
                        .catalog
                        .compatible(q, back)
                        .iter()
                        .any(|&p| self.wave.get(cell, p));
                    if !supported {
                        self.wave
                            .ban(neighbor, q, self.weights[q], self.weight_log_weights[q]);
                        changed = true;
                    }
                }

                if changed {
                    if self.wave.remaining(neighbor) == 0 {
                        return Err(neighbor);
                    }
                    self.enqueue(neighbor);
                }
            }
        }

        Ok(())
    }
}
