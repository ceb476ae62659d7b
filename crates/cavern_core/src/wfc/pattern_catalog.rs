//! Pattern catalog for the overlapping WFC model.
//!
//! Extracts every NxN patch of one or more example grids, deduplicates them
//! by content, counts occurrences as weights, and precomputes which patterns
//! may sit next to each other in each of the four directions.

use super::direction::Direction;
use super::wave_model::PatternGrid;
use crate::tile_grid::{TileGrid, TileId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building or reading a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Non-periodic input smaller than the pattern size in some dimension.
    #[error("input of {width}x{height} is smaller than the {n}x{n} pattern size")]
    InputTooSmall { width: usize, height: usize, n: usize },
    /// Input grid with no cells.
    #[error("input grid is empty")]
    EmptyInput,
    /// The catalog holds no patterns.
    #[error("catalog has no patterns")]
    NoPatterns,
    /// A pattern grid refers to a pattern the catalog does not have.
    #[error("pattern index {index} at ({x}, {y}) out of range (catalog has {count})")]
    PatternOutOfRange {
        x: usize,
        y: usize,
        index: usize,
        count: usize,
    },
}

/// Patterns, weights and directional compatibility learned from examples.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    n: usize,
    periodic_input: bool,

    /// `patterns[p]` = NxN tile block, row-major (`dx + dy * n`)
    patterns: Vec<Vec<TileId>>,

    /// Occurrence counts, parallel to `patterns`
    weights: Vec<u32>,

    /// Content -> pattern index
    lookup: HashMap<Vec<TileId>, usize>,

    /// `propagator[d][a]` = ascending list of `b` that may be placed in
    /// direction `d` from `a`
    propagator: [Vec<Vec<usize>>; 4],
}

impl PatternCatalog {
    /// Create an empty catalog. `n` is clamped to at least 1.
    pub fn new(n: usize, periodic_input: bool) -> Self {
        Self {
            n: n.max(1),
            periodic_input,
            patterns: Vec::new(),
            weights: Vec::new(),
            lookup: HashMap::new(),
            propagator: Default::default(),
        }
    }

    /// Pattern size N.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn periodic_input(&self) -> bool {
        self.periodic_input
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Add the patches of one input and recompute compatibility.
    ///
    /// May be called once per training input; patterns already known only
    /// gain weight. On error the catalog is left unchanged.
    pub fn build_from_input(&mut self, input: &TileGrid) -> Result<(), CatalogError> {
        self.build_from_inputs(std::iter::once(input))
    }

    /// Add the patches of several inputs, then compute compatibility once.
    ///
    /// Every input is validated before any is ingested, so a failing input
    /// leaves the catalog unchanged.
    pub fn build_from_inputs<'a, I>(&mut self, inputs: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = &'a TileGrid>,
    {
        let inputs: Vec<&TileGrid> = inputs.into_iter().collect();
        for input in &inputs {
            self.check_input(input)?;
        }

        for input in &inputs {
            self.ingest(input);
        }

        self.build_propagator();
        debug!(
            inputs = inputs.len(),
            patterns = self.patterns.len(),
            n = self.n,
            periodic = self.periodic_input,
            "pattern catalog built"
        );
        Ok(())
    }

    fn check_input(&self, input: &TileGrid) -> Result<(), CatalogError> {
        let (w, h) = (input.width(), input.height());
        if w == 0 || h == 0 {
            return Err(CatalogError::EmptyInput);
        }
        if !self.periodic_input && (w < self.n || h < self.n) {
            return Err(CatalogError::InputTooSmall {
                width: w,
                height: h,
                n: self.n,
            });
        }
        Ok(())
    }

    fn ingest(&mut self, input: &TileGrid) {
        let n = self.n;
        let (w, h) = (input.width(), input.height());
        let (xmax, ymax) = if self.periodic_input {
            (w, h)
        } else {
            (w + 1 - n, h + 1 - n)
        };

        for y in 0..ymax {
            for x in 0..xmax {
                let patch = extract_patch(input, x, y, n);
                match self.lookup.get(&patch) {
                    Some(&idx) => self.weights[idx] += 1,
                    None => {
                        self.lookup.insert(patch.clone(), self.patterns.len());
                        self.patterns.push(patch);
                        self.weights.push(1);
                    }
                }
            }
        }
    }

    /// O(P^2 * N^2) over all ordered pairs and directions.
    fn build_propagator(&mut self) {
        let count = self.patterns.len();
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            let lists = &mut self.propagator[dir.index()];
            lists.clear();
            lists.resize(count, Vec::new());

            for (a, pa) in self.patterns.iter().enumerate() {
                for (b, pb) in self.patterns.iter().enumerate() {
                    if patterns_agree(pa, pb, dx, dy, self.n) {
                        lists[a].push(b);
                    }
                }
            }
        }
    }

    /// Per-pattern probability mass, summing to 1.
    pub fn weights_normalized(&self) -> Result<Vec<f64>, CatalogError> {
        if self.weights.is_empty() {
            return Err(CatalogError::NoPatterns);
        }
        let sum: f64 = self.weights.iter().map(|&w| w as f64).sum();
        Ok(self.weights.iter().map(|&w| w as f64 / sum).collect())
    }

    /// Raw occurrence count of a pattern.
    pub fn weight(&self, pattern: usize) -> u32 {
        self.weights[pattern]
    }

    /// The NxN block of a pattern, row-major.
    pub fn pattern(&self, pattern: usize) -> &[TileId] {
        &self.patterns[pattern]
    }

    /// Patterns that may be placed in `dir` from `pattern`, ascending.
    pub fn compatible(&self, pattern: usize, dir: Direction) -> &[usize] {
        &self.propagator[dir.index()][pattern]
    }

    /// Whether `b` may be placed in `dir` from `a`.
    pub fn is_compatible(&self, a: usize, b: usize, dir: Direction) -> bool {
        self.compatible(a, dir).binary_search(&b).is_ok()
    }

    /// Stamp each cell's pattern into a `(W+N-1) x (H+N-1)` tile grid.
    ///
    /// Cells are visited in row-major order and later stamps overwrite
    /// earlier ones where blocks overlap. Agreement in the overlaps comes
    /// from the compatibility constraints enforced while solving and is not
    /// re-checked here.
    pub fn reconstruct_from_pattern_grid(
        &self,
        pattern_grid: &PatternGrid,
    ) -> Result<TileGrid, CatalogError> {
        let n = self.n;
        let (width, height) = (pattern_grid.width(), pattern_grid.height());
        let mut output = TileGrid::new(width + n - 1, height + n - 1, 0);

        for y in 0..height {
            for x in 0..width {
                let p = pattern_grid.get(x, y);
                let block = self
                    .patterns
                    .get(p)
                    .ok_or(CatalogError::PatternOutOfRange {
                        x,
                        y,
                        index: p,
                        count: self.patterns.len(),
                    })?;

                for dy in 0..n {
                    for dx in 0..n {
                        output.set(x + dx, y + dy, block[dx + dy * n]);
                    }
                }
            }
        }

        Ok(output)
    }
}

/// Extract the NxN patch whose top-left corner is (x, y), wrapping at the
/// input borders.
fn extract_patch(input: &TileGrid, x: usize, y: usize, n: usize) -> Vec<TileId> {
    let (w, h) = (input.width(), input.height());
    let tiles = input.tiles();
    let mut patch = vec![0; n * n];
    for dy in 0..n {
        let sy = (y + dy) % h;
        for dx in 0..n {
            let sx = (x + dx) % w;
            patch[dx + dy * n] = tiles[sx + sy * w];
        }
    }
    patch
}

/// Check if `p2`, placed at offset (dx, dy) from `p1`, agrees with `p1` on
/// every overlapping tile.
fn patterns_agree(p1: &[TileId], p2: &[TileId], dx: i32, dy: i32, n: usize) -> bool {
    let n = n as i32;

    let xmin = dx.max(0);
    let xmax = if dx < 0 { dx + n } else { n };
    let ymin = dy.max(0);
    let ymax = if dy < 0 { dy + n } else { n };

    for y in ymin..ymax {
        for x in xmin..xmax {
            let idx1 = (x + y * n) as usize;
            let idx2 = ((x - dx) + (y - dy) * n) as usize;
            if p1[idx1] != p2[idx2] {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> TileGrid {
        TileGrid::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap()
    }

    #[test]
    fn test_periodic_checkerboard_patterns() {
        let mut catalog = PatternCatalog::new(2, true);
        catalog.build_from_input(&checkerboard()).unwrap();

        // Four wrapped windows, but only two distinct blocks
        assert_eq!(catalog.pattern_count(), 2);
        assert_eq!(catalog.pattern(0), &[0, 1, 1, 0]);
        assert_eq!(catalog.pattern(1), &[1, 0, 0, 1]);
        assert_eq!(catalog.weight(0), 2);
        assert_eq!(catalog.weight(1), 2);
    }

    #[test]
    fn test_periodic_distinct_tiles_patterns() {
        let input = TileGrid::from_rows(&[vec![0, 1], vec![2, 3]]).unwrap();
        let mut catalog = PatternCatalog::new(2, true);
        catalog.build_from_input(&input).unwrap();

        assert_eq!(catalog.pattern_count(), 4);
        for p in 0..4 {
            assert_eq!(catalog.weight(p), 1);
        }
        let blocks: std::collections::HashSet<Vec<TileId>> =
            (0..4).map(|p| catalog.pattern(p).to_vec()).collect();
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn test_non_periodic_too_small_fails() {
        let mut catalog = PatternCatalog::new(3, false);
        let err = catalog.build_from_input(&checkerboard()).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InputTooSmall {
                width: 2,
                height: 2,
                n: 3
            }
        );
        assert!(catalog.is_empty());

        // Only one dimension too small
        let strip = TileGrid::from_rows(&[vec![0, 1, 0, 1]]).unwrap();
        let mut catalog = PatternCatalog::new(2, false);
        assert!(matches!(
            catalog.build_from_input(&strip),
            Err(CatalogError::InputTooSmall { .. })
        ));
    }

    #[test]
    fn test_periodic_small_input_wraps() {
        let single = TileGrid::from_rows(&[vec![5]]).unwrap();
        let mut catalog = PatternCatalog::new(3, true);
        catalog.build_from_input(&single).unwrap();
        assert_eq!(catalog.pattern_count(), 1);
        assert_eq!(catalog.pattern(0), &[5; 9]);
    }

    #[test]
    fn test_empty_input_fails() {
        let mut catalog = PatternCatalog::new(1, true);
        assert_eq!(
            catalog.build_from_input(&TileGrid::new(0, 0, 0)),
            Err(CatalogError::EmptyInput)
        );
    }

    #[test]
    fn test_n_clamped_to_one() {
        let catalog = PatternCatalog::new(0, false);
        assert_eq!(catalog.n(), 1);
    }

    #[test]
    fn test_non_periodic_extraction_bounds() {
        // 3x2 input, n=2 -> patches at x in 0..2, y in 0..1
        let input = TileGrid::from_rows(&[vec![0, 1, 2], vec![0, 1, 2]]).unwrap();
        let mut catalog = PatternCatalog::new(2, false);
        catalog.build_from_input(&input).unwrap();

        assert_eq!(catalog.pattern_count(), 2);
        assert_eq!(catalog.pattern(0), &[0, 1, 0, 1]);
        assert_eq!(catalog.pattern(1), &[1, 2, 1, 2]);
    }

    #[test]
    fn test_weights_accumulate_across_inputs() {
        let zeros = TileGrid::new(2, 2, 0);
        let mut catalog = PatternCatalog::new(1, false);
        catalog.build_from_input(&zeros).unwrap();
        assert_eq!(catalog.pattern_count(), 1);
        assert_eq!(catalog.weight(0), 4);

        let mixed = TileGrid::from_rows(&[vec![0, 7, 7]]).unwrap();
        catalog.build_from_input(&mixed).unwrap();
        assert_eq!(catalog.pattern_count(), 2);
        assert_eq!(catalog.weight(0), 5);
        assert_eq!(catalog.weight(1), 2);
        // Compatibility recomputed for the new pattern
        assert!(catalog.is_compatible(1, 0, Direction::Left));
    }

    #[test]
    fn test_failed_input_leaves_catalog_unchanged() {
        let mut catalog = PatternCatalog::new(2, false);
        let good = TileGrid::new(3, 3, 1);
        let bad = TileGrid::new(1, 5, 1);
        assert!(catalog.build_from_inputs([&good, &bad]).is_err());
        assert!(catalog.is_empty());

        catalog.build_from_inputs([&good]).unwrap();
        assert_eq!(catalog.pattern_count(), 1);
        assert_eq!(catalog.weight(0), 4);
    }

    #[test]
    fn test_weights_normalized() {
        let input = TileGrid::from_rows(&[vec![0, 0, 0, 1]]).unwrap();
        let mut catalog = PatternCatalog::new(1, false);
        catalog.build_from_input(&input).unwrap();

        let weights = catalog.weights_normalized().unwrap();
        assert_eq!(weights.len(), 2);
        assert!((weights[0] - 0.75).abs() < 1e-12);
        assert!((weights[1] - 0.25).abs() < 1e-12);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_normalized_empty_fails() {
        let catalog = PatternCatalog::new(2, true);
        assert_eq!(catalog.weights_normalized(), Err(CatalogError::NoPatterns));
    }

    #[test]
    fn test_n_one_everything_compatible() {
        let input = TileGrid::from_rows(&[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
        let mut catalog = PatternCatalog::new(1, false);
        catalog.build_from_input(&input).unwrap();

        let count = catalog.pattern_count();
        assert_eq!(count, 6);
        for dir in Direction::ALL {
            for a in 0..count {
                assert_eq!(catalog.compatible(a, dir).len(), count);
            }
        }
    }

    #[test]
    fn test_compatibility_geometry() {
        // a = 0 1    b = 1 2
        //     0 1        1 2
        let input = TileGrid::from_rows(&[vec![0, 1, 2], vec![0, 1, 2]]).unwrap();
        let mut catalog = PatternCatalog::new(2, false);
        catalog.build_from_input(&input).unwrap();
        let (a, b) = (0, 1);

        // b's left column matches a's right column
        assert!(catalog.is_compatible(a, b, Direction::Right));
        assert!(catalog.is_compatible(b, a, Direction::Left));
        assert!(!catalog.is_compatible(a, b, Direction::Left));
        assert!(!catalog.is_compatible(b, a, Direction::Right));

        // Vertical stacking of identical rows
        assert!(catalog.is_compatible(a, a, Direction::Up));
        assert!(catalog.is_compatible(a, a, Direction::Down));
        assert!(!catalog.is_compatible(a, b, Direction::Up));
    }

    #[test]
    fn test_compatibility_symmetric() {
        let input = TileGrid::from_rows(&[
            vec![0, 1, 1, 2],
            vec![1, 1, 2, 2],
            vec![0, 0, 1, 2],
            vec![2, 0, 1, 1],
        ])
        .unwrap();
        let mut catalog = PatternCatalog::new(2, true);
        catalog.build_from_input(&input).unwrap();

        let count = catalog.pattern_count();
        for dir in Direction::ALL {
            for a in 0..count {
                for b in 0..count {
                    assert_eq!(
                        catalog.is_compatible(a, b, dir),
                        catalog.is_compatible(b, a, dir.opposite()),
                        "asymmetry for ({}, {}) {:?}",
                        a,
                        b,
                        dir
                    );
                }
            }
        }
    }

    #[test]
    fn test_patterns_agree_offsets() {
        // 0 1 / 2 3 against 1 0 / 3 2
        let p1 = vec![0, 1, 2, 3];
        let p2 = vec![1, 0, 3, 2];

        // p2 to the right: p1 right column (1, 3) == p2 left column (1, 3)
        assert!(patterns_agree(&p1, &p2, 1, 0, 2));
        // p2 to the left: p1 left column (0, 2) == p2 right column (0, 2)
        assert!(patterns_agree(&p1, &p2, -1, 0, 2));
        // p2 above: p1 row 1 (2, 3) vs p2 row 0 (1, 0)
        assert!(!patterns_agree(&p1, &p2, 0, 1, 2));
    }

    #[test]
    fn test_extract_patch_wraps() {
        let input = TileGrid::from_rows(&[vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]).unwrap();
        assert_eq!(extract_patch(&input, 0, 0, 2), vec![0, 1, 3, 4]);
        assert_eq!(extract_patch(&input, 1, 1, 2), vec![4, 5, 7, 8]);
        assert_eq!(extract_patch(&input, 2, 2, 2), vec![8, 6, 2, 0]);
    }

    #[test]
    fn test_reconstruct_stamps_blocks() {
        let input = TileGrid::from_rows(&[vec![0, 1, 2], vec![0, 1, 2]]).unwrap();
        let mut catalog = PatternCatalog::new(2, false);
        catalog.build_from_input(&input).unwrap();

        let grid = PatternGrid::from_cells(2, 1, vec![0, 1]).unwrap();
        let tiles = catalog.reconstruct_from_pattern_grid(&grid).unwrap();
        assert_eq!(tiles.width(), 3);
        assert_eq!(tiles.height(), 2);
        assert_eq!(tiles, input);
    }

    #[test]
    fn test_reconstruct_out_of_range() {
        let mut catalog = PatternCatalog::new(1, true);
        catalog.build_from_input(&TileGrid::new(1, 1, 3)).unwrap();

        let grid = PatternGrid::from_cells(2, 1, vec![0, 4]).unwrap();
        assert_eq!(
            catalog.reconstruct_from_pattern_grid(&grid),
            Err(CatalogError::PatternOutOfRange {
                x: 1,
                y: 0,
                index: 4,
                count: 1
            })
        );
    }
}
