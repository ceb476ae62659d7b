//! Rectangular grids of tile IDs.
//!
//! `TileGrid` is the exchange format between the generator and everything
//! around it: CSV loaders hand one in, the WFC pipeline hands one back, and
//! the exporters and renderers consume it.
//!
//! Indexing follows `index = x + y * width`; row `y = 0` is the first line of
//! a CSV map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque tile identifier. Tile IDs are small non-negative integers.
pub type TileId = u32;

/// Error type for grid construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Rows passed to [`TileGrid::from_rows`] differ in length.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Flat data does not match the declared dimensions.
    #[error("grid of {width}x{height} needs {expected} tiles, got {found}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
}

/// A 2D grid of tile IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileId>,
}

impl TileGrid {
    /// Create a grid filled with `fill`.
    pub fn new(width: usize, height: usize, fill: TileId) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    /// Create a grid from flat row-major data.
    pub fn from_vec(width: usize, height: usize, tiles: Vec<TileId>) -> Result<Self, GridError> {
        let expected = width * height;
        if tiles.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                found: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Create a grid from rows (`rows[y][x]`).
    ///
    /// An empty row list yields a 0x0 grid.
    pub fn from_rows<R: AsRef<[TileId]>>(rows: &[R]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut tiles = Vec::with_capacity(width * height);

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Get the tile at (x, y), or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        if x < self.width && y < self.height {
            Some(self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    /// Set the tile at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    pub fn set(&mut self, x: usize, y: usize, tile: TileId) {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) out of bounds for {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        let idx = self.index(x, y);
        self.tiles[idx] = tile;
    }

    /// Flat row-major tile data.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Iterate over rows from `y = 0` upwards.
    pub fn rows(&self) -> impl Iterator<Item = &[TileId]> {
        // chunks() rejects a zero chunk size
        self.tiles.chunks(self.width.max(1))
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: TileId) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_layout() {
        let grid = TileGrid::from_rows(&[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(0));
        assert_eq!(grid.get(2, 0), Some(2));
        assert_eq!(grid.get(1, 1), Some(4));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = TileGrid::from_rows(&[vec![0, 1], vec![2]]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        assert!(TileGrid::from_vec(2, 2, vec![0; 3]).is_err());
        assert!(TileGrid::from_vec(2, 2, vec![0; 4]).is_ok());
    }

    #[test]
    fn test_set_and_count() {
        let mut grid = TileGrid::new(3, 3, 0);
        grid.set(1, 1, 2);
        grid.set(2, 0, 2);
        assert_eq!(grid.count(2), 2);
        assert_eq!(grid.count(0), 7);
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        let grid = TileGrid::from_rows(&rows).unwrap();
        let collected: Vec<Vec<TileId>> = grid.rows().map(|r| r.to_vec()).collect();
        assert_eq!(collected, rows);
    }

    #[test]
    fn test_empty_grid() {
        let rows: Vec<Vec<TileId>> = Vec::new();
        let grid = TileGrid::from_rows(&rows).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
    }
}
