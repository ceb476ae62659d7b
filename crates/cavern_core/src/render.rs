//! PNG previews of tile grids.
//!
//! Renders a `TileGrid` to an RGBA image, one `pixel_size` x `pixel_size`
//! block per tile, without any engine dependencies.

use crate::tile_grid::{TileGrid, TileId};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// Colour for tile IDs the palette does not know.
const UNKNOWN: [u8; 4] = [0xFF, 0x00, 0xFF, 0xFF];

/// Colours for IDs 3 and up when no explicit entry exists.
const FALLBACK: [[u8; 4]; 8] = [
    [0x5F, 0x57, 0x4F, 0xFF], // rock
    [0xFF, 0xEC, 0x27, 0xFF], // gold
    [0xAB, 0x52, 0x36, 0xFF], // dirt
    [0xFF, 0x00, 0x4D, 0xFF], // lava
    [0x1D, 0x2B, 0x53, 0xFF], // deep
    [0xC2, 0xC3, 0xC7, 0xFF], // stone
    [0x7E, 0x25, 0x53, 0xFF], // crystal
    [0xFF, 0xF1, 0xE8, 0xFF], // bone
];

/// Tile ID to RGBA mapping.
#[derive(Debug, Clone)]
pub struct TilePalette {
    colors: HashMap<TileId, [u8; 4]>,
}

impl Default for TilePalette {
    /// 0 sand, 1 grass, 2 water, then the fallback table.
    fn default() -> Self {
        let mut colors = HashMap::new();
        colors.insert(0, [0xE4, 0xBB, 0x40, 0xFF]); // sand
        colors.insert(1, [0x00, 0xB5, 0x43, 0xFF]); // grass
        colors.insert(2, [0x29, 0xAD, 0xFF, 0xFF]); // water
        for (i, color) in FALLBACK.iter().enumerate() {
            colors.insert(3 + i as TileId, *color);
        }
        Self { colors }
    }
}

impl TilePalette {
    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    /// Set the colour of a tile. Builder pattern.
    pub fn with_color(mut self, tile: TileId, color: [u8; 4]) -> Self {
        self.colors.insert(tile, color);
        self
    }

    pub fn get(&self, tile: TileId) -> Option<[u8; 4]> {
        self.colors.get(&tile).copied()
    }

    /// Colour for a tile, magenta if unknown.
    pub fn color(&self, tile: TileId) -> [u8; 4] {
        self.get(tile).unwrap_or(UNKNOWN)
    }
}

/// Render a grid, each tile as a `pixel_size` square (minimum 1).
pub fn render_tiles(grid: &TileGrid, palette: &TilePalette, pixel_size: u32) -> RgbaImage {
    let pixel_size = pixel_size.max(1);
    let width = grid.width() as u32 * pixel_size;
    let height = grid.height() as u32 * pixel_size;

    let mut img: RgbaImage = ImageBuffer::new(width, height);

    for (y, row) in grid.rows().enumerate() {
        for (x, &tile) in row.iter().enumerate() {
            let color = Rgba(palette.color(tile));
            for dy in 0..pixel_size {
                for dx in 0..pixel_size {
                    let px = x as u32 * pixel_size + dx;
                    let py = y as u32 * pixel_size + dy;
                    img.put_pixel(px, py, color);
                }
            }
        }
    }

    img
}

/// Save an image as PNG, creating parent directories.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), image::ImageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    img.save(path)
}

/// Render a grid with `palette` and save it to `path`.
pub fn render_to_png(
    grid: &TileGrid,
    palette: &TilePalette,
    pixel_size: u32,
    path: &Path,
) -> Result<(), image::ImageError> {
    save_png(&render_tiles(grid, palette, pixel_size), path)
}
