//! Difficulty labels for generated maps.
//!
//! A map's difficulty is read off the number of solid-block tiles it holds.

use crate::tile_grid::{TileGrid, TileId};
use serde::{Deserialize, Serialize};

/// Tile ID counted as a solid block.
pub const SOLID_BLOCK_TILE: TileId = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Classify a solid-block count: up to 2 is easy, up to 6 medium.
    pub fn from_solid_blocks(count: usize) -> Self {
        match count {
            0..=2 => Difficulty::Easy,
            3..=6 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    /// Numeric label written to labeled exports.
    pub fn label(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

pub fn difficulty(grid: &TileGrid) -> Difficulty {
    Difficulty::from_solid_blocks(grid.count(SOLID_BLOCK_TILE))
}
