//! Wave state for Wave Function Collapse.
//!
//! The Wave tracks which patterns are still possible at each cell, packed
//! one bit per (cell, pattern), together with the running sums needed for
//! weighted Shannon entropy. Domains only ever shrink: the only mutation is
//! `ban`.

use bitvec::prelude::*;

/// Per-cell pattern domains plus entropy bookkeeping.
///
/// Entropy per cell is `ln(sum w) - sum(w ln w) / sum w` over the surviving
/// patterns, with `w` the normalized pattern weights. The sums are kept
/// incrementally so selection does not rescan every domain.
#[derive(Debug, Clone)]
pub struct Wave {
    /// `data[cell * p + pattern]` = pattern still possible at cell
    data: BitVec,

    /// Remaining possible patterns per cell
    sums_of_ones: Vec<usize>,

    /// Sum of weights of remaining patterns per cell
    sums_of_weights: Vec<f64>,

    /// Sum of weight*ln(weight) of remaining patterns per cell
    sums_of_weight_log_weights: Vec<f64>,

    /// Shannon entropy per cell
    entropies: Vec<f64>,

    /// Number of cells
    length: usize,

    /// Number of patterns
    p: usize,
}

impl Wave {
    /// Create a wave with every pattern possible at every cell.
    ///
    /// * `length` - Number of cells
    /// * `weights` - Normalized pattern weights
    /// * `weight_log_weights` - `w * ln(w)` per pattern
    pub fn new(length: usize, weights: &[f64], weight_log_weights: &[f64]) -> Self {
        let p = weights.len();
        let sum_of_weights: f64 = weights.iter().sum();
        let sum_of_weight_log_weights: f64 = weight_log_weights.iter().sum();
        let starting_entropy = entropy_of(sum_of_weights, sum_of_weight_log_weights);

        Self {
            data: bitvec![1; length * p],
            sums_of_ones: vec![p; length],
            sums_of_weights: vec![sum_of_weights; length],
            sums_of_weight_log_weights: vec![sum_of_weight_log_weights; length],
            entropies: vec![starting_entropy; length],
            length,
            p,
        }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of patterns.
    #[inline]
    pub fn pattern_count(&self) -> usize {
        self.p
    }

    /// Whether a pattern is still possible at a cell.
    #[inline]
    pub fn get(&self, cell: usize, pattern: usize) -> bool {
        self.data[cell * self.p + pattern]
    }

    /// Remove a pattern from a cell's domain and update its entropy.
    ///
    /// Returns false if the pattern was already banned.
    pub fn ban(&mut self, cell: usize, pattern: usize, weight: f64, weight_log_weight: f64) -> bool {
        let idx = cell * self.p + pattern;
        if !self.data[idx] {
            return false;
        }
        self.data.set(idx, false);

        self.sums_of_ones[cell] -= 1;
        self.sums_of_weights[cell] -= weight;
        self.sums_of_weight_log_weights[cell] -= weight_log_weight;
        self.entropies[cell] = entropy_of(
            self.sums_of_weights[cell],
            self.sums_of_weight_log_weights[cell],
        );
        true
    }

    /// Remaining possibilities at a cell.
    #[inline]
    pub fn remaining(&self, cell: usize) -> usize {
        self.sums_of_ones[cell]
    }

    /// Weighted Shannon entropy at a cell.
    #[inline]
    pub fn entropy(&self, cell: usize) -> f64 {
        self.entropies[cell]
    }

    /// The cell's domain as a bit slice indexed by pattern.
    #[inline]
    pub fn domain(&self, cell: usize) -> &BitSlice {
        &self.data[cell * self.p..(cell + 1) * self.p]
    }

    /// All patterns still possible at a cell, ascending.
    pub fn possible_patterns(&self, cell: usize) -> Vec<usize> {
        self.domain(cell).iter_ones().collect()
    }

    /// The single remaining pattern at a cell, if it is collapsed.
    pub fn collapsed_pattern(&self, cell: usize) -> Option<usize> {
        if self.sums_of_ones[cell] != 1 {
            return None;
        }
        self.domain(cell).first_one()
    }

    /// Any cell with an empty domain.
    pub fn is_contradiction(&self) -> bool {
        self.sums_of_ones.iter().any(|&s| s == 0)
    }

    /// Every cell holds exactly one pattern.
    pub fn is_collapsed(&self) -> bool {
        self.sums_of_ones.iter().all(|&s| s == 1)
    }
}

/// `ln(sum w) - sum(w ln w) / sum w`; zero for an empty domain.
fn entropy_of(sum_of_weights: f64, sum_of_weight_log_weights: f64) -> f64 {
    if sum_of_weights > 0.0 {
        sum_of_weights.ln() - sum_of_weight_log_weights / sum_of_weights
    } else {
        0.0
    }
}
